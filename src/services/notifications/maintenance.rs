use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::NotificationService;
use crate::errors::{LmsError, Result};
use crate::models::notifications::responses::{CleanupResponse, NotificationStats};

/// 删除 `days` 天前的通知及其投递记录
pub async fn cleanup_old_notifications(
    service: &NotificationService,
    days: i64,
    now: DateTime<Utc>,
) -> Result<CleanupResponse> {
    if days < 1 {
        return Err(LmsError::validation_failed("保留天数必须至少为 1 天"));
    }

    let cutoff = now - Duration::days(days);
    let deleted = service
        .get_storage()
        .delete_notifications_before(cutoff)
        .await?;

    info!("Cleaned up {} notification(s) older than {} day(s)", deleted, days);
    Ok(CleanupResponse { deleted })
}

pub async fn notification_stats(service: &NotificationService) -> Result<NotificationStats> {
    service.get_storage().notification_stats().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::entities::{NotificationType, RelatedRefs};
    use crate::test_utils::seed_fixture;

    #[tokio::test]
    async fn test_cleanup_removes_notifications_and_deliveries() {
        let f = seed_fixture().await;
        let service = f.notification_service();
        service
            .notify_class(
                f.class.id,
                NotificationType::AssignmentUpdated,
                "t".into(),
                "m".into(),
                RelatedRefs::default(),
            )
            .await
            .expect("fan out");

        // 相对于现在，通知还不满 30 天
        let kept = service
            .cleanup_old_notifications(30, Utc::now())
            .await
            .expect("cleanup");
        assert_eq!(kept.deleted, 0);

        let later = Utc::now() + Duration::days(31);
        let removed = service
            .cleanup_old_notifications(30, later)
            .await
            .expect("cleanup");
        assert_eq!(removed.deleted, 1);

        let stats = service.stats().await.expect("stats");
        assert_eq!(stats.total_notifications, 0);
        assert_eq!(stats.total_deliveries, 0);
    }

    #[tokio::test]
    async fn test_stats_group_by_type() {
        let f = seed_fixture().await;
        let service = f.notification_service();
        for notification_type in [
            NotificationType::MaterialUploaded,
            NotificationType::MaterialUploaded,
            NotificationType::GradePublished,
        ] {
            service
                .notify_class(
                    f.class.id,
                    notification_type,
                    "t".into(),
                    "m".into(),
                    RelatedRefs::default(),
                )
                .await
                .expect("fan out");
        }

        let stats = service.stats().await.expect("stats");
        assert_eq!(stats.total_notifications, 3);
        let materials = stats
            .by_type
            .iter()
            .find(|t| t.notification_type == NotificationType::MaterialUploaded)
            .map(|t| t.count);
        assert_eq!(materials, Some(2));
    }

    #[tokio::test]
    async fn test_cleanup_rejects_non_positive_days() {
        let f = seed_fixture().await;
        let result = f
            .notification_service()
            .cleanup_old_notifications(0, Utc::now())
            .await;
        assert!(matches!(result, Err(LmsError::ValidationFailed(_))));
    }
}
