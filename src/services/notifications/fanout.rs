use tracing::debug;

use super::NotificationService;
use crate::errors::Result;
use crate::models::notifications::{
    entities::{NewNotification, NotificationType, RelatedRefs},
    responses::FanOutResult,
};

/// 为班级当前的全部学生扇出一条通知
///
/// 接收者在调用时实时查询；班级没有学生时仍然创建通知，只是没有投递记录。
pub async fn notify_class(
    service: &NotificationService,
    class_id: i64,
    notification_type: NotificationType,
    title: String,
    message: String,
    mut related: RelatedRefs,
) -> Result<FanOutResult> {
    let storage = service.get_storage();

    related.class_id.get_or_insert(class_id);

    let notification = storage
        .create_notification(NewNotification {
            title,
            message,
            notification_type,
            related,
        })
        .await?;

    let student_ids = storage.list_class_student_ids(class_id).await?;
    let recipients = storage
        .create_user_notifications(notification.id, &student_ids)
        .await?;

    debug!(
        "Notification {} ({}) delivered to {} student(s) of class {}",
        notification.id, notification_type, recipients, class_id
    );

    Ok(FanOutResult {
        notification,
        recipients,
    })
}
