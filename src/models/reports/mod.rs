//! 只读统计视图，全部由提交与作业数据折叠而来

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::PaginationInfo;
use crate::models::assignments::entities::{Assignment, AssignmentStatus};
use crate::models::classes::entities::ClassBrief;
use crate::models::submissions::entities::Submission;

/// 成绩统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/report.ts")]
pub struct GradeStatistics {
    pub count: i64,
    pub average_score: f64,
    pub highest_score: i32,
    pub lowest_score: i32,
    pub average_percentage: f64,
}

/// 参与统计的一条已批改成绩
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedScore {
    pub score: i32,
    pub max_score: i32,
}

// 学生作业筛选
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "lms/report.ts")]
pub enum StudentAssignmentFilter {
    #[default]
    All,
    Submitted,
    Pending,
    Overdue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "lms/report.ts")]
pub enum AssignmentSortBy {
    #[default]
    Deadline,
    Created,
    Class,
    Grade,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "lms/report.ts")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// 学生跨班级作业查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "lms/report.ts")]
pub struct StudentAssignmentsQuery {
    #[serde(default)]
    pub status: StudentAssignmentFilter,
    #[serde(default)]
    pub sort_by: AssignmentSortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// 每个作业对学生而言的归类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "lms/report.ts")]
pub enum SubmissionBucket {
    Submitted, // 已有提交（无论是否迟交）
    Pending,   // 未提交且未截止
    Overdue,   // 未提交且已截止
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/report.ts")]
pub struct StudentAssignmentRow {
    pub assignment: Assignment,
    pub class: ClassBrief,
    pub bucket: SubmissionBucket,
    pub submission: Option<Submission>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/report.ts")]
pub struct StudentAssignmentsSummary {
    pub total: i64,
    pub submitted: i64,
    pub pending: i64,
    pub overdue: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/report.ts")]
pub struct StudentAssignmentsResponse {
    pub items: Vec<StudentAssignmentRow>,
    pub pagination: PaginationInfo,
    pub summary: StudentAssignmentsSummary,
}

/// 学生成绩条目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/report.ts")]
pub struct StudentGradeItem {
    pub assignment_id: i64,
    pub assignment_title: String,
    pub class: ClassBrief,
    pub score: i32,
    pub max_score: i32,
    pub percentage: f64,
    pub feedback: Option<String>,
    pub graded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/report.ts")]
pub struct StudentGradesResponse {
    pub grades: Vec<StudentGradeItem>,
    pub statistics: GradeStatistics,
}

/// 教师看板中的单个作业统计
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/report.ts")]
pub struct TeacherAssignmentStats {
    pub assignment_id: i64,
    pub title: String,
    pub class: ClassBrief,
    pub status: AssignmentStatus,
    pub deadline: DateTime<Utc>,
    pub enrolled_students: i64,
    pub submitted: i64,
    pub graded: i64,
    pub late: i64,
    pub submission_rate: f64,
    pub statistics: GradeStatistics,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/report.ts")]
pub struct TeacherDashboardResponse {
    pub total_classes: i64,
    pub total_assignments: i64,
    pub total_students: i64,
    pub pending_grading: i64,
    pub assignments: Vec<TeacherAssignmentStats>,
}
