use super::AssignmentService;
use crate::errors::Result;
use crate::models::assignments::{entities::AssignmentListView, responses::AssignmentListResponse};
use crate::models::users::entities::{User, UserRole};
use crate::services::access::{ensure_class_access, load_class};

/// 列出班级作业
///
/// 学生只看到已发布与已截止的作业以及自己的最新提交；教师和管理员看到全部状态与提交数量。
pub async fn list_class_assignments(
    service: &AssignmentService,
    class_id: i64,
    caller: &User,
) -> Result<AssignmentListResponse> {
    let storage = service.get_storage();
    load_class(storage, class_id).await?;
    ensure_class_access(storage, caller, class_id).await?;

    let view = match caller.role {
        UserRole::Student => AssignmentListView::ForStudent {
            student_id: caller.id,
        },
        UserRole::Teacher | UserRole::Admin => AssignmentListView::ForTeacher,
    };

    storage.list_class_assignments(class_id, view).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LmsError;
    use crate::test_utils::seed_fixture;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_student_sees_only_published_with_own_submission() {
        let f = seed_fixture().await;
        let deadline = Utc::now() + Duration::days(1);
        let published = f.published_assignment(deadline).await;
        f.draft_assignment(deadline).await;
        f.submit_as(&f.students[0], published.id).await;
        f.submit_as(&f.students[1], published.id).await;

        let service = f.assignment_service();
        match service
            .list_for_class(f.class.id, &f.students[0])
            .await
            .expect("student list")
        {
            AssignmentListResponse::ForStudent { items } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].assignment.id, published.id);
                let mine = items[0].my_submission.as_ref().expect("own submission");
                assert_eq!(mine.student_id, f.students[0].id);
            }
            other => panic!("unexpected view: {other:?}"),
        }

        match service
            .list_for_class(f.class.id, &f.teacher)
            .await
            .expect("teacher list")
        {
            AssignmentListResponse::ForTeacher { items } => {
                assert_eq!(items.len(), 2);
                let counted = items
                    .iter()
                    .find(|i| i.assignment.id == published.id)
                    .expect("published item");
                assert_eq!(counted.submission_count, 2);
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_member_cannot_list() {
        let f = seed_fixture().await;
        let service = f.assignment_service();

        let result = service.list_for_class(f.class.id, &f.outsider).await;
        assert!(matches!(result, Err(LmsError::AccessDenied(_))));

        let missing = service.list_for_class(9999, &f.teacher).await;
        assert!(matches!(missing, Err(LmsError::NotFound(_))));
    }
}
