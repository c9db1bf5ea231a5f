//! `fetch` plumbing shared by the endpoint wrappers

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use super::HttpApi;
use crate::error::{ApiError, ApiResult};

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn js_error(err: JsValue) -> ApiError {
    ApiError::transport(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

impl HttpApi {
    /// Send a request and return the parsed JSON body (`null` when empty)
    pub(super) async fn send<B: Serialize + ?Sized>(&self, method: &str, path: &str, body: Option<&B>) -> ApiResult<JsValue> {
        let url = self.url(path);
        tracing::debug!(method, url = %url, "request");

        let headers = Headers::new().map_err(js_error)?;
        headers.set("Accept", "application/json").map_err(js_error)?;
        if let Some(token) = &self.token {
            headers.set("Authorization", &format!("Bearer {}", token)).map_err(js_error)?;
        }

        let init = RequestInit::new();
        init.set_method(method);
        if let Some(body) = body {
            let json = serde_json::to_string(body).map_err(|e| ApiError::Request(e.to_string()))?;
            headers.set("Content-Type", "application/json").map_err(js_error)?;
            init.set_body(&JsValue::from_str(&json));
        }
        init.set_headers(&headers);

        let request = Request::new_with_str_and_init(&url, &init).map_err(js_error)?;
        let window = web_sys::window().ok_or_else(|| ApiError::transport("no window"))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;

        // Empty or non-JSON bodies read as null
        let payload = match response.json() {
            Ok(promise) => JsFuture::from(promise).await.unwrap_or(JsValue::NULL),
            Err(_) => JsValue::NULL,
        };

        if !response.ok() {
            let message = serde_wasm_bindgen::from_value::<ErrorBody>(payload)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| response.status_text());
            tracing::error!(method, url = %url, status = response.status(), %message, "request failed");
            return Err(ApiError::Status { status: response.status(), message });
        }
        Ok(payload)
    }

    pub(super) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let payload = self.send::<()>("GET", path, None).await?;
        decode(payload)
    }
}

pub(super) fn decode<T: DeserializeOwned>(payload: JsValue) -> ApiResult<T> {
    serde_wasm_bindgen::from_value(payload).map_err(|e| ApiError::malformed(e.to_string()))
}
