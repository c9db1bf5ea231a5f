//! Authorization predicate for route guards

use super::manager::Session;

/// Outcome of checking a session against an optional required role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// Initial decode still running; nothing is decided yet
    Pending,
    DeniedUnauthenticated,
    DeniedWrongRole,
    Granted,
}

/// Role comparison is case-insensitive ("Helper" satisfies "helper")
pub fn authorize(session: &Session, required_role: Option<&str>) -> Authorization {
    if session.is_loading {
        return Authorization::Pending;
    }
    let Some(identity) = session.identity.as_ref() else {
        return Authorization::DeniedUnauthenticated;
    };
    match required_role {
        Some(required) if identity.role.to_lowercase() != required.to_lowercase() => {
            Authorization::DeniedWrongRole
        }
        _ => Authorization::Granted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Identity;

    fn session_with_role(role: &str) -> Session {
        Session {
            identity: Some(Identity {
                token: "t".to_string(),
                email: Some("a@x.com".to_string()),
                role: role.to_string(),
                id: None,
                full_name: None,
                image: None,
                expires_at: None,
            }),
            is_loading: false,
        }
    }

    #[test]
    fn test_pending_wins_over_everything() {
        let mut session = session_with_role("Helper");
        session.is_loading = true;
        assert_eq!(authorize(&session, Some("helper")), Authorization::Pending);
        assert_eq!(authorize(&Session::pending(), None), Authorization::Pending);
    }

    #[test]
    fn test_role_matching() {
        let session = session_with_role("Seeker");
        assert_eq!(authorize(&session, Some("seeker")), Authorization::Granted);
        assert_eq!(authorize(&session, Some("SEEKER")), Authorization::Granted);
        assert_eq!(authorize(&session, Some("helper")), Authorization::DeniedWrongRole);
        assert_eq!(authorize(&session, None), Authorization::Granted);
    }

    #[test]
    fn test_anonymous_is_denied() {
        assert_eq!(authorize(&Session::anonymous(), None), Authorization::DeniedUnauthenticated);
        assert_eq!(authorize(&Session::anonymous(), Some("helper")), Authorization::DeniedUnauthenticated);
    }
}
