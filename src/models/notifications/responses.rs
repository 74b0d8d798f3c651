use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{Notification, NotificationType, RelatedRefs, UserNotification};
use crate::models::PaginatedResponse;

/// 面向接收者的通知条目，id 为投递记录 ID
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct NotificationItem {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub related_data: RelatedRefs,
}

impl NotificationItem {
    pub fn from_parts(delivery: UserNotification, notification: Notification) -> Self {
        Self {
            id: delivery.id,
            title: notification.title,
            message: notification.message,
            notification_type: notification.notification_type,
            is_read: delivery.is_read,
            read_at: delivery.read_at,
            created_at: notification.created_at,
            related_data: notification.related,
        }
    }
}

pub type NotificationListResponse = PaginatedResponse<NotificationItem>;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// 一次扇出的结果
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct FanOutResult {
    pub notification: Notification,
    pub recipients: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub count: i64,
}

/// 通知统计（管理员）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct NotificationStats {
    pub total_notifications: i64,
    pub total_deliveries: i64,
    pub unread_deliveries: i64,
    pub by_type: Vec<TypeCount>,
}

/// 截止提醒执行结果
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct ReminderRunSummary {
    pub assignments_checked: u64,
    pub reminders_created: u64,
    pub already_reminded: u64,
    pub recipients: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct CleanupResponse {
    pub deleted: u64,
}
