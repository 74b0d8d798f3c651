use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use std::collections::HashSet;
use tracing::{debug, info};

use super::NotificationService;
use crate::errors::Result;
use crate::models::notifications::{
    entities::{NewNotification, NotificationType, RelatedRefs},
    responses::ReminderRunSummary,
};

/// 本地时区中 `now` 所在日期的零点
fn start_of_local_day(offset: FixedOffset, now: DateTime<Utc>) -> DateTime<Utc> {
    let local_midnight = now
        .with_timezone(&offset)
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default();
    offset
        .from_local_datetime(&local_midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

/// 截止提醒
///
/// 对截止时间落在 (now, now + window] 内的已发布作业：今天已经提醒过的跳过，
/// 否则创建一条提醒，只投递给还没有提交的学生。同一天多次调用不会重复发送。
pub async fn deadline_reminders(
    service: &NotificationService,
    now: DateTime<Utc>,
    window_hours: i64,
) -> Result<ReminderRunSummary> {
    let storage = service.get_storage();
    let today_start = start_of_local_day(service.utc_offset, now);

    let due = storage
        .list_published_due_between(now, now + Duration::hours(window_hours))
        .await?;

    let mut summary = ReminderRunSummary {
        assignments_checked: due.len() as u64,
        ..Default::default()
    };

    for assignment in due {
        if storage
            .find_notification_since(
                assignment.id,
                NotificationType::AssignmentDeadlineReminder,
                today_start,
            )
            .await?
            .is_some()
        {
            debug!("Assignment {} already reminded today", assignment.id);
            summary.already_reminded += 1;
            continue;
        }

        let notification = storage
            .create_notification(NewNotification {
                title: format!("作业提醒：{}", assignment.title),
                message: format!(
                    "作业「{}」将于 {} 截止，别忘了提交！",
                    assignment.title,
                    service.format_local(assignment.deadline)
                ),
                notification_type: NotificationType::AssignmentDeadlineReminder,
                related: RelatedRefs::for_assignment(assignment.class_id, assignment.id),
            })
            .await?;

        let submitted: HashSet<i64> = storage
            .list_latest_submissions(assignment.id)
            .await?
            .into_iter()
            .map(|s| s.student_id)
            .collect();

        let recipients: Vec<i64> = storage
            .list_class_student_ids(assignment.class_id)
            .await?
            .into_iter()
            .filter(|id| !submitted.contains(id))
            .collect();

        summary.recipients += storage
            .create_user_notifications(notification.id, &recipients)
            .await?;
        summary.reminders_created += 1;
    }

    info!(
        "Deadline reminders: checked {}, created {}, skipped {}, recipients {}",
        summary.assignments_checked,
        summary.reminders_created,
        summary.already_reminded,
        summary.recipients
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::test_utils::seed_fixture;

    #[test]
    fn test_start_of_local_day_uses_offset() {
        let offset = FixedOffset::east_opt(7 * 3600).expect("offset");

        // UTC 18:30 在 UTC+7 已经是次日 01:30
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 18, 30, 0).unwrap();
        assert_eq!(
            start_of_local_day(offset, now),
            Utc.with_ymd_and_hms(2025, 3, 1, 17, 0, 0).unwrap()
        );

        let utc = FixedOffset::east_opt(0).expect("offset");
        assert_eq!(
            start_of_local_day(utc, now),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_second_run_same_day_does_not_resend() {
        let f = seed_fixture().await;
        let now = Utc::now();
        f.published_assignment(now + Duration::hours(10)).await;
        let service = f.notification_service();

        let first = service.deadline_reminders(now, 24).await.expect("first");
        assert_eq!(first.reminders_created, 1);
        assert_eq!(first.recipients, 3);

        let second = service.deadline_reminders(now, 24).await.expect("second");
        assert_eq!(second.assignments_checked, 1);
        assert_eq!(second.reminders_created, 0);
        assert_eq!(second.already_reminded, 1);

        let stats = service.stats().await.expect("stats");
        assert_eq!(stats.total_deliveries, 3);
    }

    #[tokio::test]
    async fn test_submitted_students_are_excluded() {
        let f = seed_fixture().await;
        let now = Utc::now();
        let assignment = f.published_assignment(now + Duration::hours(5)).await;
        f.submit_as(&f.students[0], assignment.id).await;

        let service = f.notification_service();
        let summary = service.deadline_reminders(now, 24).await.expect("run");
        assert_eq!(summary.reminders_created, 1);
        assert_eq!(summary.recipients, 2);

        let submitted_view = service
            .list(f.students[0].id, NotificationListQuery::default())
            .await
            .expect("list");
        assert!(
            submitted_view
                .items
                .iter()
                .all(|n| n.notification_type != NotificationType::AssignmentDeadlineReminder)
        );

        let pending_view = service
            .list(f.students[1].id, NotificationListQuery::default())
            .await
            .expect("list");
        assert!(
            pending_view
                .items
                .iter()
                .any(|n| n.related_data.assignment_id == Some(assignment.id))
        );
    }

    #[tokio::test]
    async fn test_next_day_reminds_again() {
        let f = seed_fixture().await;
        let now = Utc::now();
        f.published_assignment(now + Duration::hours(30)).await;
        let service = f.notification_service();

        let first = service.deadline_reminders(now, 48).await.expect("first");
        assert_eq!(first.reminders_created, 1);

        let tomorrow = now + Duration::days(1);
        let next = service.deadline_reminders(tomorrow, 24).await.expect("next");
        assert_eq!(next.reminders_created, 1);
        assert_eq!(next.already_reminded, 0);
    }

    #[tokio::test]
    async fn test_outside_window_or_draft_is_ignored() {
        let f = seed_fixture().await;
        let now = Utc::now();
        f.published_assignment(now + Duration::hours(48)).await;
        f.draft_assignment(now + Duration::hours(2)).await;

        let summary = f
            .notification_service()
            .deadline_reminders(now, 24)
            .await
            .expect("run");
        assert_eq!(summary.assignments_checked, 0);
        assert_eq!(summary.reminders_created, 0);
    }
}
