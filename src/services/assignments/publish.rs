use tracing::{error, info};

use super::AssignmentService;
use crate::errors::{LmsError, Result};
use crate::models::assignments::entities::{Assignment, AssignmentStatus};
use crate::models::notifications::entities::{NotificationType, RelatedRefs};

/// 发布作业并通知班级学生
///
/// 状态切换先提交；之后的通知失败只记录日志，不会回滚发布。
pub async fn publish_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    teacher_id: i64,
) -> Result<Assignment> {
    let assignment = service.load_owned(assignment_id, teacher_id).await?;
    let storage = service.get_storage();

    if !storage.mark_assignment_published(assignment_id).await? {
        let message = match assignment.status {
            AssignmentStatus::Closed => "作业已关闭，无法发布",
            _ => "作业已发布",
        };
        return Err(LmsError::invalid_state(message));
    }

    let published = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| LmsError::not_found("作业不存在"))?;

    info!(
        "Teacher {} published assignment {}",
        teacher_id, published.id
    );

    let class_name = match storage.get_class_by_id(published.class_id).await {
        Ok(Some(class)) => class.name,
        _ => String::new(),
    };

    let outcome = service
        .notifications
        .notify_class(
            published.class_id,
            NotificationType::AssignmentCreated,
            format!("新作业：{}", published.title),
            format!(
                "班级 {} 新增了作业，截止时间：{}",
                class_name,
                service.notifications.format_local(published.deadline)
            ),
            RelatedRefs::for_assignment(published.class_id, published.id),
        )
        .await;

    if let Err(e) = outcome {
        error!(
            "Assignment {} published but notification fan-out failed: {}",
            published.id, e
        );
    }

    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::test_utils::seed_fixture;
    use chrono::{Duration, Utc};
    use sea_orm::ConnectionTrait;

    #[tokio::test]
    async fn test_publish_notifies_enrolled_students() {
        let f = seed_fixture().await;
        let draft = f.draft_assignment(Utc::now() + Duration::days(2)).await;

        let published = f
            .assignment_service()
            .publish(draft.id, f.teacher.id)
            .await
            .expect("publish");
        assert_eq!(published.status, AssignmentStatus::Published);

        for student in &f.students {
            let list = f
                .notification_service()
                .list(student.id, NotificationListQuery::default())
                .await
                .expect("list");
            assert_eq!(list.items.len(), 1);
            assert_eq!(list.items[0].notification_type, NotificationType::AssignmentCreated);
            assert_eq!(list.items[0].related_data.assignment_id, Some(draft.id));
        }

        let outsider = f
            .notification_service()
            .unread_count(f.outsider.id)
            .await
            .expect("count");
        assert_eq!(outsider.count, 0);
    }

    #[tokio::test]
    async fn test_publish_twice_is_invalid_state() {
        let f = seed_fixture().await;
        let draft = f.draft_assignment(Utc::now() + Duration::days(2)).await;
        let service = f.assignment_service();

        service.publish(draft.id, f.teacher.id).await.expect("first");
        let second = service.publish(draft.id, f.teacher.id).await;
        assert!(matches!(second, Err(LmsError::InvalidState(_))));

        let current = f
            .storage
            .get_assignment_by_id(draft.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(current.status, AssignmentStatus::Published);

        // 第二次失败不会再发通知
        let stats = f.notification_service().stats().await.expect("stats");
        assert_eq!(stats.total_notifications, 1);
    }

    #[tokio::test]
    async fn test_publish_requires_owner() {
        let f = seed_fixture().await;
        let draft = f.draft_assignment(Utc::now() + Duration::days(2)).await;

        let result = f
            .assignment_service()
            .publish(draft.id, f.other_teacher.id)
            .await;
        assert!(matches!(result, Err(LmsError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_roll_back_publish() {
        let f = seed_fixture().await;
        let draft = f.draft_assignment(Utc::now() + Duration::days(2)).await;

        // 让扇出步骤必然失败
        f.db.execute_unprepared("DROP TABLE user_notifications")
            .await
            .expect("drop deliveries");
        f.db.execute_unprepared("DROP TABLE notifications")
            .await
            .expect("drop notifications");

        let published = f
            .assignment_service()
            .publish(draft.id, f.teacher.id)
            .await
            .expect("publish must succeed");
        assert_eq!(published.status, AssignmentStatus::Published);

        let current = f
            .storage
            .get_assignment_by_id(draft.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(current.status, AssignmentStatus::Published);
    }
}
