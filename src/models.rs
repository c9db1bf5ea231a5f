//! Frontend Models
//!
//! Data structures matching backend payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task lifecycle status (matches backend strings exactly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl TaskStatus {
    /// Column order on the board
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Exact, case-sensitive match on the wire string
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Position in the natural pending -> in-progress -> completed order
    pub fn rank(self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Completed => 2,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job fields embedded in a task when the backend populates the reference
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
}

/// Job reference: populated object or bare id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobRef {
    Populated(JobSummary),
    Id(String),
}

impl JobRef {
    fn summary(&self) -> Option<&JobSummary> {
        match self {
            JobRef::Populated(job) => Some(job),
            JobRef::Id(_) => None,
        }
    }
}

/// Task data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "jobId", default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeker_email: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date_time: Option<DateTime<Utc>>,
}

impl Task {
    fn job(&self) -> Option<&JobSummary> {
        self.job.as_ref().and_then(JobRef::summary)
    }

    pub fn title(&self) -> &str {
        self.job()
            .and_then(|job| job.job_title.as_deref())
            .or(self.job_title.as_deref())
            .unwrap_or("Unknown Job")
    }

    pub fn category(&self) -> &str {
        self.job()
            .and_then(|job| job.category.as_deref())
            .or(self.job_category.as_deref())
            .unwrap_or("N/A")
    }

    pub fn sub_category(&self) -> &str {
        self.job()
            .and_then(|job| job.sub_category.as_deref())
            .or(self.job_sub_category.as_deref())
            .unwrap_or("N/A")
    }

    pub fn location(&self) -> &str {
        self.job()
            .and_then(|job| job.location.as_deref())
            .or(self.location.as_deref())
            .unwrap_or("N/A")
    }

    pub fn salary(&self) -> Option<&str> {
        self.job().and_then(|job| job.salary_range.as_deref())
    }

    pub fn task_status(&self) -> Option<TaskStatus> {
        TaskStatus::parse(&self.status)
    }
}

/// Body of `PUT /tasks/{id}/status`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date_time: Option<DateTime<Utc>>,
}

/// Login form payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Registration form payload
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub contact_no: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub skills: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub experience: String,
}

/// Profile returned by `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_exact() {
        assert_eq!(TaskStatus::parse("in-progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("In-Progress"), None);
        assert_eq!(TaskStatus::parse("done"), None);
    }

    #[test]
    fn test_task_with_populated_job() {
        let json = r#"{
            "_id": "t1",
            "jobId": {"_id": "j1", "jobTitle": "Deep Clean", "category": "Cleaning", "location": "Pune"},
            "status": "pending"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.title(), "Deep Clean");
        assert_eq!(task.category(), "Cleaning");
        assert_eq!(task.sub_category(), "N/A");
        assert_eq!(task.location(), "Pune");
        assert_eq!(task.task_status(), Some(TaskStatus::Pending));
    }

    #[test]
    fn test_task_with_bare_job_id_falls_back() {
        let json = r#"{"_id": "t2", "jobId": "j9", "jobTitle": "Cooking", "status": "completed"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.job, Some(JobRef::Id("j9".to_string())));
        assert_eq!(task.title(), "Cooking");
        assert_eq!(task.category(), "N/A");

        let bare: Task = serde_json::from_str(r#"{"_id": "t3", "status": "pending"}"#).unwrap();
        assert_eq!(bare.title(), "Unknown Job");
    }

    #[test]
    fn test_status_update_omits_missing_timestamp() {
        let body = StatusUpdate { status: TaskStatus::InProgress, completion_date_time: None };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"status":"in-progress"}"#);
    }
}
