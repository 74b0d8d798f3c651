use std::collections::HashMap;

use super::AssignmentService;
use crate::errors::{LmsError, Result};
use crate::models::assignments::{
    entities::AssignmentStatus,
    responses::{AssignmentDetailResponse, AssignmentWithContext},
};
use crate::models::submissions::responses::SubmissionWithStudent;
use crate::models::users::entities::{User, UserRole};
use crate::services::access::{ensure_class_access, load_class};

pub async fn get_assignment_detail(
    service: &AssignmentService,
    assignment_id: i64,
    caller: &User,
) -> Result<AssignmentDetailResponse> {
    let storage = service.get_storage();
    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| LmsError::not_found("作业不存在"))?;

    let class = load_class(storage, assignment.class_id).await?;
    ensure_class_access(storage, caller, class.id).await?;

    if caller.role == UserRole::Student && assignment.status == AssignmentStatus::Draft {
        return Err(LmsError::invalid_state("作业尚未发布"));
    }

    let teacher = storage
        .get_user_by_id(assignment.teacher_id)
        .await?
        .ok_or_else(|| LmsError::not_found("教师不存在"))?;

    let submissions = match caller.role {
        UserRole::Student => {
            let me = caller.brief();
            storage
                .list_submission_history(assignment.id, caller.id)
                .await?
                .into_iter()
                .map(|submission| SubmissionWithStudent {
                    submission,
                    student: Some(me.clone()),
                })
                .collect()
        }
        UserRole::Teacher | UserRole::Admin => {
            let latest = storage.list_latest_submissions(assignment.id).await?;
            let student_ids: Vec<i64> = latest.iter().map(|s| s.student_id).collect();
            let students: HashMap<i64, User> = storage
                .list_users_by_ids(&student_ids)
                .await?
                .into_iter()
                .map(|u| (u.id, u))
                .collect();

            latest
                .into_iter()
                .map(|submission| {
                    let student = students.get(&submission.student_id).map(User::brief);
                    SubmissionWithStudent {
                        submission,
                        student,
                    }
                })
                .collect()
        }
    };

    Ok(AssignmentDetailResponse {
        context: AssignmentWithContext {
            assignment,
            class: class.brief(),
            teacher: teacher.brief(),
        },
        submissions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seed_fixture;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_student_detail_contains_own_history_newest_first() {
        let f = seed_fixture().await;
        let assignment = f.published_assignment(Utc::now() + Duration::days(1)).await;
        f.submit_as(&f.students[0], assignment.id).await;
        f.submit_as(&f.students[0], assignment.id).await;
        f.submit_as(&f.students[1], assignment.id).await;

        let detail = f
            .assignment_service()
            .get_detail(assignment.id, &f.students[0])
            .await
            .expect("detail");

        assert_eq!(detail.context.assignment.id, assignment.id);
        assert_eq!(detail.context.teacher.id, f.teacher.id);
        let versions: Vec<i32> = detail.submissions.iter().map(|s| s.submission.version).collect();
        assert_eq!(versions, vec![2, 1]);
        assert!(
            detail
                .submissions
                .iter()
                .all(|s| s.submission.student_id == f.students[0].id)
        );
    }

    #[tokio::test]
    async fn test_teacher_detail_lists_latest_per_student() {
        let f = seed_fixture().await;
        let assignment = f.published_assignment(Utc::now() + Duration::days(1)).await;
        f.submit_as(&f.students[0], assignment.id).await;
        f.submit_as(&f.students[0], assignment.id).await;
        f.submit_as(&f.students[1], assignment.id).await;

        let detail = f
            .assignment_service()
            .get_detail(assignment.id, &f.teacher)
            .await
            .expect("detail");

        assert_eq!(detail.submissions.len(), 2);
        assert!(detail.submissions.iter().all(|s| s.submission.is_latest));
        assert!(detail.submissions.iter().all(|s| s.student.is_some()));
    }

    #[tokio::test]
    async fn test_student_cannot_open_draft() {
        let f = seed_fixture().await;
        let draft = f.draft_assignment(Utc::now() + Duration::days(1)).await;

        let result = f
            .assignment_service()
            .get_detail(draft.id, &f.students[0])
            .await;
        assert!(matches!(result, Err(LmsError::InvalidState(_))));
    }
}
