//! Auth Endpoints

use async_trait::async_trait;

use super::http::decode;
use super::{AuthApi, HttpApi};
use crate::error::ApiResult;
use crate::models::{Credentials, LoginResponse, Profile, Registration};

#[async_trait(?Send)]
impl AuthApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let payload = self.send("POST", "/auth/login", Some(credentials)).await?;
        decode(payload)
    }

    async fn register(&self, registration: &Registration) -> ApiResult<()> {
        self.send("POST", "/auth/register", Some(registration)).await?;
        Ok(())
    }

    async fn me(&self) -> ApiResult<Profile> {
        self.get("/auth/me").await
    }
}
