//! Task Endpoints

use async_trait::async_trait;

use super::http::decode;
use super::{helper_tasks_path, task_status_path, HttpApi, TaskApi};
use crate::error::{ApiError, ApiResult};
use crate::models::{StatusUpdate, Task};

#[async_trait(?Send)]
impl TaskApi for HttpApi {
    async fn list_helper_tasks(&self, helper: &str) -> ApiResult<Vec<Task>> {
        let payload = self.send::<()>("GET", &helper_tasks_path(helper), None).await?;
        if !js_sys::Array::is_array(&payload) {
            return Err(ApiError::malformed("expected an array of tasks"));
        }
        decode(payload)
    }

    async fn update_task_status(&self, task_id: &str, update: &StatusUpdate) -> ApiResult<()> {
        // Body is the updated task or a bare success flag; neither is needed
        self.send("PUT", &task_status_path(task_id), Some(update)).await?;
        Ok(())
    }
}
