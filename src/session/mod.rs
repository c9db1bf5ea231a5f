//! Session Layer
//!
//! Credential token decoding, persistence, the session manager and the
//! authorization predicate used by route guards.

mod guard;
mod manager;
mod storage;
mod token;

pub use guard::{authorize, Authorization};
pub use manager::{initials, Identity, Session, SessionEvent, SessionManager};
pub use storage::{BrowserTokenStore, MemoryTokenStore, TokenStore};
pub use token::{decode_claims, Claims};

#[cfg(test)]
pub(crate) use token::test_token;

/// What `login` does when the token has no role claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingRolePolicy {
    /// Accept the caller-supplied role and log a warning
    #[default]
    Fallback,
    /// Fail the login
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub missing_role_policy: MissingRolePolicy,
    /// Treat tokens whose `exp` has passed as undecodable
    pub enforce_expiry: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            missing_role_policy: MissingRolePolicy::Fallback,
            enforce_expiry: true,
        }
    }
}
