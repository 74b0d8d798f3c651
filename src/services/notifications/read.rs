use chrono::{DateTime, Utc};

use super::NotificationService;
use crate::errors::{LmsError, Result};
use crate::models::notifications::{
    entities::UserNotification,
    responses::{MarkAllReadResponse, UnreadCountResponse},
};

/// 标记单条已读
///
/// 不属于调用者的投递记录按不存在处理；重复标记是无操作的成功。
pub async fn mark_read(
    service: &NotificationService,
    user_notification_id: i64,
    caller_id: i64,
    now: DateTime<Utc>,
) -> Result<UserNotification> {
    let storage = service.get_storage();

    let delivery = storage
        .get_user_notification(user_notification_id, caller_id)
        .await?
        .ok_or_else(|| LmsError::not_found("通知不存在"))?;

    if delivery.is_read {
        return Ok(delivery);
    }

    storage
        .mark_user_notification_read(user_notification_id, caller_id, now)
        .await?;

    storage
        .get_user_notification(user_notification_id, caller_id)
        .await?
        .ok_or_else(|| LmsError::not_found("通知不存在"))
}

pub async fn mark_all_read(
    service: &NotificationService,
    caller_id: i64,
    now: DateTime<Utc>,
) -> Result<MarkAllReadResponse> {
    let updated = service
        .get_storage()
        .mark_all_user_notifications_read(caller_id, now)
        .await?;
    Ok(MarkAllReadResponse { updated })
}

pub async fn unread_count(
    service: &NotificationService,
    caller_id: i64,
) -> Result<UnreadCountResponse> {
    let count = service
        .get_storage()
        .count_unread_notifications(caller_id)
        .await?;
    Ok(UnreadCountResponse { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::entities::{NotificationType, RelatedRefs};
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::test_utils::{Fixture, seed_fixture};

    async fn fan_out_times(f: &Fixture, times: usize) {
        let service = f.notification_service();
        for i in 0..times {
            service
                .notify_class(
                    f.class.id,
                    NotificationType::MaterialUploaded,
                    format!("资料 {i}"),
                    "内容".into(),
                    RelatedRefs::default(),
                )
                .await
                .expect("fan out");
        }
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let f = seed_fixture().await;
        fan_out_times(&f, 1).await;
        let service = f.notification_service();
        let student = &f.students[0];

        let list = service
            .list(student.id, NotificationListQuery::default())
            .await
            .expect("list");
        let id = list.items[0].id;

        let first = service.mark_read(id, student.id).await.expect("first");
        assert!(first.is_read);
        let first_read_at = first.read_at;
        assert!(first_read_at.is_some());

        let again = mark_read(
            &service,
            id,
            student.id,
            Utc::now() + chrono::Duration::hours(1),
        )
        .await
        .expect("second");
        assert!(again.is_read);
        assert_eq!(again.read_at, first_read_at);
    }

    #[tokio::test]
    async fn test_mark_read_of_foreign_delivery_is_not_found() {
        let f = seed_fixture().await;
        fan_out_times(&f, 1).await;
        let service = f.notification_service();

        let list = service
            .list(f.students[0].id, NotificationListQuery::default())
            .await
            .expect("list");
        let id = list.items[0].id;

        let result = service.mark_read(id, f.students[1].id).await;
        assert!(matches!(result, Err(LmsError::NotFound(_))));

        let count = service.unread_count(f.students[0].id).await.expect("count");
        assert_eq!(count.count, 1);
    }

    #[tokio::test]
    async fn test_mark_all_read_only_touches_unread() {
        let f = seed_fixture().await;
        fan_out_times(&f, 7).await;
        let service = f.notification_service();
        let student = &f.students[0];

        let list = service
            .list(student.id, NotificationListQuery::default())
            .await
            .expect("list");
        assert_eq!(list.items.len(), 7);

        let earlier = Utc::now() - chrono::Duration::days(2);
        let mut already_read = Vec::new();
        for item in list.items.iter().take(2) {
            let read = mark_read(&service, item.id, student.id, earlier)
                .await
                .expect("mark");
            already_read.push(read);
        }

        let result = service.mark_all_read(student.id).await.expect("mark all");
        assert_eq!(result.updated, 5);

        for read in already_read {
            let current = f
                .storage
                .get_user_notification(read.id, student.id)
                .await
                .expect("get")
                .expect("exists");
            assert_eq!(current.read_at, read.read_at);
        }

        let count = service.unread_count(student.id).await.expect("count");
        assert_eq!(count.count, 0);

        let none_left = service.mark_all_read(student.id).await.expect("mark all");
        assert_eq!(none_left.updated, 0);
    }
}
