use serde::Deserialize;
use ts_rs::TS;

use super::entities::NotificationType;
use crate::models::common::pagination::PaginationQuery;

/// 通知列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct NotificationListQuery {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(rename = "type")]
    pub notification_type: Option<NotificationType>,
}

fn default_cleanup_days() -> i64 {
    30
}

/// 清理旧通知参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct CleanupQuery {
    #[serde(default = "default_cleanup_days")]
    pub days: i64,
}

/// 手动触发截止提醒，未指定窗口时使用调度配置
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "lms/notification.ts")]
pub struct ReminderRunQuery {
    pub window_hours: Option<i64>,
}
