use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::Submission;
use crate::models::users::entities::UserBrief;

/// 提交结果，附带给调用方展示的迟交提示
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/submission.ts")]
pub struct SubmitResponse {
    pub submission: Submission,
    pub message: String,
}

/// 附带学生信息的提交
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/submission.ts")]
pub struct SubmissionWithStudent {
    pub submission: Submission,
    pub student: Option<UserBrief>,
}
