use serde::Deserialize;
use ts_rs::TS;

/// 学生提交作业请求
///
/// 文件本身由外部文件存储上传，这里只携带其元数据。
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "lms/submission.ts")]
pub struct SubmitAssignmentRequest {
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

impl SubmitAssignmentRequest {
    pub fn has_content(&self) -> bool {
        self.content
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    pub fn has_file(&self) -> bool {
        self.file_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// 批改请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "lms/submission.ts")]
pub struct GradeSubmissionRequest {
    pub score: i32,
    pub feedback: Option<String>,
}
