//! 通知扇出服务
//!
//! 一个事件只写一条共享的通知，再为每个接收者写一条投递记录。

pub mod fanout;
pub mod list;
pub mod maintenance;
pub mod read;
pub mod reminders;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::notifications::{
    entities::{NotificationType, RelatedRefs, UserNotification},
    requests::NotificationListQuery,
    responses::{
        CleanupResponse, FanOutResult, MarkAllReadResponse, NotificationListResponse,
        NotificationStats, ReminderRunSummary, UnreadCountResponse,
    },
};
use crate::models::users::entities::User;
use crate::storage::Storage;

#[derive(Clone)]
pub struct NotificationService {
    storage: Arc<dyn Storage>,
    // 计算“今天”与展示截止时间所用的时区
    utc_offset: FixedOffset,
}

impl NotificationService {
    pub fn new(storage: Arc<dyn Storage>, utc_offset_hours: i32) -> Self {
        // 非法偏移量回退到 UTC
        let utc_offset = FixedOffset::east_opt(utc_offset_hours.saturating_mul(3600))
            .unwrap_or_else(|| Utc.fix());
        Self {
            storage,
            utc_offset,
        }
    }

    pub(crate) fn get_storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub(crate) fn format_local(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.utc_offset)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    pub async fn notify_class(
        &self,
        class_id: i64,
        notification_type: NotificationType,
        title: String,
        message: String,
        related: RelatedRefs,
    ) -> Result<FanOutResult> {
        fanout::notify_class(self, class_id, notification_type, title, message, related).await
    }

    pub async fn mark_read(
        &self,
        user_notification_id: i64,
        caller_id: i64,
    ) -> Result<UserNotification> {
        read::mark_read(self, user_notification_id, caller_id, Utc::now()).await
    }

    pub async fn mark_all_read(&self, caller_id: i64) -> Result<MarkAllReadResponse> {
        read::mark_all_read(self, caller_id, Utc::now()).await
    }

    pub async fn unread_count(&self, caller_id: i64) -> Result<UnreadCountResponse> {
        read::unread_count(self, caller_id).await
    }

    pub async fn list(
        &self,
        caller_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        list::list_notifications(self, caller_id, query).await
    }

    pub async fn list_for_class(
        &self,
        caller: &User,
        class_id: i64,
        query: NotificationListQuery,
    ) -> Result<NotificationListResponse> {
        list::list_class_notifications(self, caller, class_id, query).await
    }

    pub async fn deadline_reminders(
        &self,
        now: DateTime<Utc>,
        window_hours: i64,
    ) -> Result<ReminderRunSummary> {
        reminders::deadline_reminders(self, now, window_hours).await
    }

    pub async fn cleanup_old_notifications(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<CleanupResponse> {
        maintenance::cleanup_old_notifications(self, days, now).await
    }

    pub async fn stats(&self) -> Result<NotificationStats> {
        maintenance::notification_stats(self).await
    }
}
