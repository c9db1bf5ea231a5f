//! Backend REST Client
//!
//! Browser `fetch` bindings to the backend, organized by domain. The core
//! talks to the traits so tests can substitute in-memory fakes.

mod auth;
mod http;
mod tasks;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::ApiResult;
use crate::models::{Credentials, LoginResponse, Profile, Registration, StatusUpdate, Task};

/// Characters `encodeURIComponent` leaves alone
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[async_trait(?Send)]
pub trait TaskApi {
    /// `GET /tasks/helper/{identity}`
    async fn list_helper_tasks(&self, helper: &str) -> ApiResult<Vec<Task>>;

    /// `PUT /tasks/{id}/status`
    async fn update_task_status(&self, task_id: &str, update: &StatusUpdate) -> ApiResult<()>;
}

#[async_trait(?Send)]
pub trait AuthApi {
    /// `POST /auth/login`
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;

    /// `POST /auth/register`
    async fn register(&self, registration: &Registration) -> ApiResult<()>;

    /// `GET /auth/me`
    async fn me(&self) -> ApiResult<Profile>;
}

/// `fetch`-backed client for the REST backend
#[derive(Debug, Clone, PartialEq)]
pub struct HttpApi {
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

pub fn helper_tasks_path(helper: &str) -> String {
    format!("/tasks/helper/{}", encode_segment(helper))
}

pub fn task_status_path(task_id: &str) -> String {
    format!("/tasks/{}/status", encode_segment(task_id))
}
