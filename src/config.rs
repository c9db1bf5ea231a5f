//! Application Configuration
//!
//! Compile-time defaults, overridable through `HOUSEPAL_API_URL` at build time.

use crate::board::TransitionPolicy;
use crate::session::SessionConfig;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Storage key holding the credential token
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// REST backend base URL, without trailing slash
    pub api_base_url: String,
    pub session: SessionConfig,
    pub transition_policy: TransitionPolicy,
}

impl AppConfig {
    /// Build-time configuration
    pub fn from_env() -> Self {
        let api_base_url = option_env!("HOUSEPAL_API_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL);
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            session: SessionConfig::default(),
            transition_policy: TransitionPolicy::AllowAll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MissingRolePolicy;

    #[test]
    fn test_defaults_match_backend_contract() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.transition_policy, TransitionPolicy::AllowAll);
        assert_eq!(config.session.missing_role_policy, MissingRolePolicy::Fallback);
        assert!(config.session.enforce_expiry);
    }

    #[test]
    fn test_from_env_has_no_trailing_slash() {
        assert!(!AppConfig::from_env().api_base_url.ends_with('/'));
    }
}
