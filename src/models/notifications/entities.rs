use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "lms/notification.ts")]
pub enum NotificationType {
    AssignmentCreated,
    AssignmentUpdated,
    AssignmentDeadlineReminder,
    MaterialUploaded,
    GradePublished,
    QuizCreated,
    QuizUpdated,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::AssignmentCreated => "ASSIGNMENT_CREATED",
            NotificationType::AssignmentUpdated => "ASSIGNMENT_UPDATED",
            NotificationType::AssignmentDeadlineReminder => "ASSIGNMENT_DEADLINE_REMINDER",
            NotificationType::MaterialUploaded => "MATERIAL_UPLOADED",
            NotificationType::GradePublished => "GRADE_PUBLISHED",
            NotificationType::QuizCreated => "QUIZ_CREATED",
            NotificationType::QuizUpdated => "QUIZ_UPDATED",
        }
    }

    pub fn all() -> &'static [NotificationType] {
        &[
            NotificationType::AssignmentCreated,
            NotificationType::AssignmentUpdated,
            NotificationType::AssignmentDeadlineReminder,
            NotificationType::MaterialUploaded,
            NotificationType::GradePublished,
            NotificationType::QuizCreated,
            NotificationType::QuizUpdated,
        ]
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NotificationType::all()
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Invalid notification type: {s}"))
    }
}

/// 触发通知的关联对象
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct RelatedRefs {
    pub class_id: Option<i64>,
    pub assignment_id: Option<i64>,
    pub material_id: Option<i64>,
    pub quiz_id: Option<i64>,
}

impl RelatedRefs {
    pub fn for_assignment(class_id: i64, assignment_id: i64) -> Self {
        Self {
            class_id: Some(class_id),
            assignment_id: Some(assignment_id),
            ..Default::default()
        }
    }
}

/// 同一事件的所有接收者共享一条通知
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related: RelatedRefs,
    pub created_at: DateTime<Utc>,
}

/// 每个接收者一条投递记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct UserNotification {
    pub id: i64,
    pub user_id: i64,
    pub notification_id: i64,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 存储层创建通知所需字段
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related: RelatedRefs,
}
