use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::Assignment;
use crate::models::classes::entities::ClassBrief;
use crate::models::submissions::entities::Submission;
use crate::models::submissions::responses::SubmissionWithStudent;
use crate::models::users::entities::UserBrief;

/// 附带班级与教师信息的作业
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/assignment.ts")]
pub struct AssignmentWithContext {
    pub assignment: Assignment,
    pub class: ClassBrief,
    pub teacher: UserBrief,
}

/// 教师视角的列表项
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/assignment.ts")]
pub struct TeacherAssignmentItem {
    pub assignment: Assignment,
    pub submission_count: i64,
}

/// 学生视角的列表项
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/assignment.ts")]
pub struct StudentAssignmentItem {
    pub assignment: Assignment,
    pub my_submission: Option<Submission>,
}

/// 班级作业列表，按调用者角色区分形态
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "view", rename_all = "snake_case")]
#[ts(export, export_to = "lms/assignment.ts")]
pub enum AssignmentListResponse {
    ForTeacher { items: Vec<TeacherAssignmentItem> },
    ForStudent { items: Vec<StudentAssignmentItem> },
}

impl AssignmentListResponse {
    pub fn len(&self) -> usize {
        match self {
            AssignmentListResponse::ForTeacher { items } => items.len(),
            AssignmentListResponse::ForStudent { items } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 作业详情
///
/// 学生看到自己的全部提交版本（新到旧），教师看到每个学生的最新提交。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/assignment.ts")]
pub struct AssignmentDetailResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub context: AssignmentWithContext,
    pub submissions: Vec<SubmissionWithStudent>,
}
