use std::collections::HashMap;

use super::SubmissionService;
use crate::errors::{LmsError, Result};
use crate::models::submissions::responses::SubmissionWithStudent;
use crate::models::users::entities::User;

/// 作业下每个学生的最新提交，按提交时间倒序
pub async fn list_for_assignment(
    service: &SubmissionService,
    assignment_id: i64,
    teacher_id: i64,
) -> Result<Vec<SubmissionWithStudent>> {
    let assignment = service.load_assignment(assignment_id).await?;
    if !assignment.is_owned_by(teacher_id) {
        return Err(LmsError::access_denied("只能查看自己作业下的提交"));
    }

    let storage = service.get_storage();
    let latest = storage.list_latest_submissions(assignment_id).await?;

    let ids: Vec<i64> = latest.iter().map(|s| s.student_id).collect();
    let students: HashMap<i64, User> = storage
        .list_users_by_ids(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(latest
        .into_iter()
        .map(|submission| SubmissionWithStudent {
            student: students.get(&submission.student_id).map(User::brief),
            submission,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seed_fixture;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_lists_latest_newest_first_with_students() {
        let f = seed_fixture().await;
        let assignment = f.published_assignment(Utc::now() + Duration::days(1)).await;
        f.submit_as(&f.students[0], assignment.id).await;
        f.submit_as(&f.students[1], assignment.id).await;
        let resubmitted = f.submit_as(&f.students[0], assignment.id).await;

        let items = f
            .submission_service()
            .list_for_assignment(assignment.id, f.teacher.id)
            .await
            .expect("list");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].submission.id, resubmitted.id);
        assert_eq!(items[0].submission.version, 2);
        assert_eq!(
            items[0].student.as_ref().map(|s| s.id),
            Some(f.students[0].id)
        );
    }

    #[tokio::test]
    async fn test_requires_ownership() {
        let f = seed_fixture().await;
        let assignment = f.published_assignment(Utc::now() + Duration::days(1)).await;

        let result = f
            .submission_service()
            .list_for_assignment(assignment.id, f.other_teacher.id)
            .await;
        assert!(matches!(result, Err(LmsError::AccessDenied(_))));
    }
}
