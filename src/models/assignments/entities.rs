use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 作业状态：只能 draft → published → closed 单向流转
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "lms/assignment.ts")]
pub enum AssignmentStatus {
    Draft,     // 草稿，学生不可见
    Published, // 已发布
    Closed,    // 已截止（系统关闭）
}

impl AssignmentStatus {
    pub const DRAFT: &'static str = "draft";
    pub const PUBLISHED: &'static str = "published";
    pub const CLOSED: &'static str = "closed";

    /// 学生可见的状态
    pub fn student_visible() -> &'static [AssignmentStatus] {
        &[AssignmentStatus::Published, AssignmentStatus::Closed]
    }

    pub fn is_student_visible(&self) -> bool {
        Self::student_visible().contains(self)
    }
}

impl<'de> Deserialize<'de> for AssignmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<AssignmentStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的作业状态: '{s}'. 支持的状态: draft, published, closed"
            ))
        })
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Draft => write!(f, "{}", AssignmentStatus::DRAFT),
            AssignmentStatus::Published => write!(f, "{}", AssignmentStatus::PUBLISHED),
            AssignmentStatus::Closed => write!(f, "{}", AssignmentStatus::CLOSED),
        }
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AssignmentStatus::DRAFT => Ok(AssignmentStatus::Draft),
            AssignmentStatus::PUBLISHED => Ok(AssignmentStatus::Published),
            AssignmentStatus::CLOSED => Ok(AssignmentStatus::Closed),
            _ => Err(format!("Invalid assignment status: {s}")),
        }
    }
}

// 作业实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub class_id: i64,
    pub teacher_id: i64,
    pub title: String,
    pub description: String,
    pub instruction: Option<String>,
    pub deadline: DateTime<Utc>,
    pub max_score: i32,
    pub status: AssignmentStatus,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn is_owned_by(&self, teacher_id: i64) -> bool {
        self.teacher_id == teacher_id
    }

    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }
}

// 按角色区分的列表查询形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentListView {
    // 全部状态，附带提交数量
    ForTeacher,
    // 仅已发布/已截止，附带该学生的最新提交
    ForStudent { student_id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_visibility() {
        assert!(!AssignmentStatus::Draft.is_student_visible());
        assert!(AssignmentStatus::Published.is_student_visible());
        assert!(AssignmentStatus::Closed.is_student_visible());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "published".parse::<AssignmentStatus>(),
            Ok(AssignmentStatus::Published)
        );
        assert!("PUBLISHED".parse::<AssignmentStatus>().is_err());
    }
}
