use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

fn default_max_score() -> i32 {
    100
}

/// 创建作业请求
///
/// 请求中携带的任何状态字段都会被忽略，新作业总是草稿。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "lms/assignment.ts")]
pub struct CreateAssignmentRequest {
    pub class_id: i64,
    pub title: String,
    pub description: String,
    pub instruction: Option<String>,
    pub deadline: DateTime<Utc>, // ISO 8601 格式，如 "2026-01-24T12:00:00Z"
    #[serde(default = "default_max_score")]
    pub max_score: i32,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

/// 更新作业请求，未提供的字段保持不变
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "lms/assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub max_score: Option<i32>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
}

impl UpdateAssignmentRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.instruction.is_none()
            && self.deadline.is_none()
            && self.max_score.is_none()
            && self.file_url.is_none()
            && self.file_name.is_none()
    }
}
