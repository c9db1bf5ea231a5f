//! Error Types
//!
//! `thiserror` enums for each failure class; UI code shows their `Display` text.

use thiserror::Error;

/// Credential token could not be turned into a session
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token must have three dot-separated segments, found {0}")]
    Malformed(usize),

    #[error("claims segment is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("claims segment is not valid JSON: {0}")]
    Claims(#[from] serde_json::Error),

    #[error("claims segment is not a JSON object")]
    NotAnObject,

    #[error("token carries no role claim")]
    MissingRole,

    #[error("token expired at {0}")]
    Expired(chrono::DateTime<chrono::Utc>),
}

/// Login rejected by the session manager
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid credential token: {0}")]
    Token(#[from] TokenError),

    #[error("no role in token and no fallback role accepted")]
    MissingRole,

    #[error("could not persist token: {0}")]
    Storage(String),
}

/// Remote call failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Network failure or browser API error
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response; carries the server's `message` when present
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Body did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("could not encode request: {0}")]
    Request(String),
}

impl ApiError {
    pub fn transport(msg: impl Into<String>) -> Self {
        ApiError::Transport(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        ApiError::MalformedResponse(msg.into())
    }

    /// Text shown to the user, falling back to a generic message
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Transport(msg) if !msg.is_empty() => msg.clone(),
            _ => "Unknown error".to_string(),
        }
    }
}

/// Task board failures surfaced in the error banner
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    #[error("Invalid task data format from server")]
    MalformedResponse,

    #[error("Failed to load tasks: {0}")]
    Load(String),

    #[error("Failed to update task status: {0}")]
    Update(String),

    #[error("User not authenticated")]
    NotAuthenticated,
}

impl From<ApiError> for BoardError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MalformedResponse(_) => BoardError::MalformedResponse,
            other => BoardError::Load(other.user_message()),
        }
    }
}

/// Login/register form rejected before any request is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Full name is required")]
    FullNameRequired,

    #[error("Contact number is required")]
    ContactRequired,

    #[error("Passwords don't match")]
    PasswordMismatch,

    #[error("Skills are required for Helpers")]
    SkillsRequired,

    #[error("Valid email is required")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
}

/// Login or registration failure shown on the auth page
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] FormError),

    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("Role not provided by server")]
    MissingRole,

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type ApiResult<T> = Result<T, ApiError>;
