//! Login & Registration Flow
//!
//! Form checks and the remote half of signing in. The resulting token is
//! handed to the session manager by the caller.

use tracing::{info, warn};

use crate::api::AuthApi;
use crate::error::{AuthError, FormError};
use crate::models::{Credentials, Registration};
use crate::session::decode_claims;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Something like `name@host.tld` somewhere in the input
pub fn looks_like_email(input: &str) -> bool {
    input.split_whitespace().any(|word| {
        word.char_indices().any(|(at, c)| {
            if c != '@' || at == 0 {
                return false;
            }
            let domain = &word[at + 1..];
            domain
                .char_indices()
                .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len())
        })
    })
}

pub fn validate_login(credentials: &Credentials) -> Result<(), FormError> {
    if !looks_like_email(&credentials.email) {
        return Err(FormError::InvalidEmail);
    }
    if credentials.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FormError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_registration(registration: &Registration) -> Result<(), FormError> {
    if registration.full_name.trim().is_empty() {
        return Err(FormError::FullNameRequired);
    }
    if registration.contact_no.trim().is_empty() {
        return Err(FormError::ContactRequired);
    }
    if registration.password != registration.confirm_password {
        return Err(FormError::PasswordMismatch);
    }
    if registration.role.eq_ignore_ascii_case("helper") && registration.skills.trim().is_empty() {
        return Err(FormError::SkillsRequired);
    }
    validate_login(&Credentials {
        email: registration.email.clone(),
        password: registration.password.clone(),
    })
}

/// Token and role accepted by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    pub token: String,
    pub role: String,
}

/// Exchange credentials for a token
///
/// The role comes from the response, else from the token's own claims.
pub async fn request_login<A: AuthApi + ?Sized>(api: &A, credentials: &Credentials) -> Result<LoginGrant, AuthError> {
    validate_login(credentials)?;
    let response = api.login(credentials).await?;

    let role = response
        .role
        .as_deref()
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .or_else(|| {
            decode_claims(&response.token)
                .ok()
                .and_then(|claims| claims.role().map(str::to_string))
        });
    let Some(role) = role else {
        warn!("login response carries no role");
        return Err(AuthError::MissingRole);
    };

    info!(%role, "credentials accepted");
    Ok(LoginGrant { token: response.token, role })
}

pub async fn request_registration<A: AuthApi + ?Sized>(api: &A, registration: &Registration) -> Result<(), AuthError> {
    validate_registration(registration)?;
    api.register(registration).await?;
    info!(role = %registration.role, "registered");
    Ok(())
}

/// Email from `/auth/me`, for sessions whose token does not carry one
pub async fn profile_email<A: AuthApi + ?Sized>(api: &A) -> Option<String> {
    match api.me().await {
        Ok(profile) => {
            let email = profile.email.trim();
            (!email.is_empty()).then(|| email.to_string())
        }
        Err(err) => {
            warn!(error = %err, "profile lookup failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::{ApiError, ApiResult};
    use crate::models::{LoginResponse, Profile};
    use crate::session::test_token;

    #[derive(Default)]
    struct FakeAuth {
        login: RefCell<Option<ApiResult<LoginResponse>>>,
        registered: RefCell<Vec<Registration>>,
        profile: RefCell<Option<ApiResult<Profile>>>,
    }

    #[async_trait(?Send)]
    impl AuthApi for FakeAuth {
        async fn login(&self, _credentials: &Credentials) -> ApiResult<LoginResponse> {
            self.login.borrow_mut().take().unwrap_or_else(|| Err(ApiError::transport("offline")))
        }

        async fn register(&self, registration: &Registration) -> ApiResult<()> {
            self.registered.borrow_mut().push(registration.clone());
            Ok(())
        }

        async fn me(&self) -> ApiResult<Profile> {
            self.profile.borrow_mut().take().unwrap_or_else(|| Err(ApiError::transport("offline")))
        }
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials { email: email.to_string(), password: password.to_string() }
    }

    fn registration(role: &str) -> Registration {
        Registration {
            full_name: "Ana Lee".to_string(),
            email: "ana@x.com".to_string(),
            contact_no: "0123".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            role: role.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("a@x.com"));
        assert!(looks_like_email("first.last@mail.example.org"));
        assert!(!looks_like_email(""));
        assert!(!looks_like_email("a@x"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("a@.com"));
        assert!(!looks_like_email("a@x."));
        assert!(!looks_like_email("a @x.com"));
    }

    #[test]
    fn test_validate_login() {
        assert_eq!(validate_login(&credentials("a@x.com", "123456")), Ok(()));
        assert_eq!(validate_login(&credentials("ax.com", "123456")), Err(FormError::InvalidEmail));
        assert_eq!(validate_login(&credentials("a@x.com", "12345")), Err(FormError::PasswordTooShort));
    }

    #[test]
    fn test_validate_registration_order() {
        assert_eq!(validate_registration(&registration("Seeker")), Ok(()));

        let mut form = registration("Helper");
        assert_eq!(validate_registration(&form), Err(FormError::SkillsRequired));
        form.skills = "cooking".to_string();
        assert_eq!(validate_registration(&form), Ok(()));

        form.confirm_password = "other".to_string();
        assert_eq!(validate_registration(&form), Err(FormError::PasswordMismatch));

        form.full_name.clear();
        form.contact_no.clear();
        assert_eq!(validate_registration(&form), Err(FormError::FullNameRequired));
    }

    #[tokio::test]
    async fn test_login_role_from_response() {
        let api = FakeAuth::default();
        let token = test_token(json!({"email": "a@x.com", "role": "Seeker"}));
        *api.login.borrow_mut() = Some(Ok(LoginResponse { token: token.clone(), role: Some("Helper".to_string()) }));

        let grant = request_login(&api, &credentials("a@x.com", "123456")).await.unwrap();
        assert_eq!(grant, LoginGrant { token, role: "Helper".to_string() });
    }

    #[tokio::test]
    async fn test_login_role_from_claims() {
        let api = FakeAuth::default();
        let token = test_token(json!({"email": "a@x.com", "role": "Seeker"}));
        *api.login.borrow_mut() = Some(Ok(LoginResponse { token, role: Some(" ".to_string()) }));

        let grant = request_login(&api, &credentials("a@x.com", "123456")).await.unwrap();
        assert_eq!(grant.role, "Seeker");
    }

    #[tokio::test]
    async fn test_login_without_any_role_fails() {
        let api = FakeAuth::default();
        let token = test_token(json!({"email": "a@x.com"}));
        *api.login.borrow_mut() = Some(Ok(LoginResponse { token, role: None }));

        let err = request_login(&api, &credentials("a@x.com", "123456")).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingRole));
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let api = FakeAuth::default();
        let err = request_login(&api, &credentials("nope", "123456")).await.unwrap_err();
        assert!(matches!(err, AuthError::Invalid(FormError::InvalidEmail)));

        let mut form = registration("Seeker");
        form.contact_no.clear();
        assert!(request_registration(&api, &form).await.is_err());
        assert!(api.registered.borrow().is_empty());

        request_registration(&api, &registration("Seeker")).await.unwrap();
        assert_eq!(api.registered.borrow().len(), 1);
    }

    fn profile(email: &str) -> Profile {
        Profile { email: email.to_string(), full_name: None, role: None, image: None }
    }

    #[tokio::test]
    async fn test_profile_email_backfill() {
        let api = FakeAuth::default();
        *api.profile.borrow_mut() = Some(Ok(profile(" a@x.com ")));
        assert_eq!(profile_email(&api).await.as_deref(), Some("a@x.com"));

        *api.profile.borrow_mut() = Some(Ok(profile("  ")));
        assert_eq!(profile_email(&api).await, None);

        assert_eq!(profile_email(&api).await, None);
    }
}
