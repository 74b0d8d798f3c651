use chrono::{DateTime, Utc};
use tracing::info;

use super::AssignmentService;
use crate::errors::{LmsError, Result};
use crate::models::assignments::{
    requests::CreateAssignmentRequest, responses::AssignmentWithContext,
};
use crate::models::users::entities::User;
use crate::services::access::{ensure_teacher_of_class, load_class};
use crate::utils::validate;

fn validate_create(req: &CreateAssignmentRequest, now: DateTime<Utc>) -> Result<()> {
    validate::validate_title(&req.title).map_err(LmsError::validation_failed)?;
    validate::validate_description(&req.description).map_err(LmsError::validation_failed)?;
    if let Some(instruction) = &req.instruction {
        validate::validate_instruction(instruction).map_err(LmsError::validation_failed)?;
    }
    validate::validate_max_score(req.max_score).map_err(LmsError::validation_failed)?;
    validate::validate_deadline(req.deadline, now).map_err(LmsError::validation_failed)?;
    Ok(())
}

/// 创建作业，总是以草稿状态保存，不发送通知
pub async fn create_assignment(
    service: &AssignmentService,
    teacher: &User,
    req: CreateAssignmentRequest,
    now: DateTime<Utc>,
) -> Result<AssignmentWithContext> {
    validate_create(&req, now)?;

    let storage = service.get_storage();
    let class = load_class(storage, req.class_id).await?;
    ensure_teacher_of_class(storage, teacher.id, class.id).await?;

    let assignment = storage.create_assignment(teacher.id, req).await?;
    info!(
        "Teacher {} created assignment {} in class {}",
        teacher.id, assignment.id, class.id
    );

    Ok(AssignmentWithContext {
        assignment,
        class: class.brief(),
        teacher: teacher.brief(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::AssignmentStatus;
    use crate::test_utils::{create_request, seed_fixture};
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_is_always_draft_with_context() {
        let f = seed_fixture().await;
        let req = create_request(f.class.id, Utc::now() + Duration::days(3));

        let created = f
            .assignment_service()
            .create(&f.teacher, req)
            .await
            .expect("create");

        assert_eq!(created.assignment.status, AssignmentStatus::Draft);
        assert_eq!(created.assignment.max_score, 100);
        assert_eq!(created.class.id, f.class.id);
        assert_eq!(created.teacher.id, f.teacher.id);

        // 创建不产生通知
        let stats = f.notification_service().stats().await.expect("stats");
        assert_eq!(stats.total_notifications, 0);
    }

    #[tokio::test]
    async fn test_create_requires_teaching_link() {
        let f = seed_fixture().await;
        let req = create_request(f.class.id, Utc::now() + Duration::days(3));

        let result = f.assignment_service().create(&f.other_teacher, req).await;
        assert!(matches!(result, Err(LmsError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let f = seed_fixture().await;
        let service = f.assignment_service();

        let mut past = create_request(f.class.id, Utc::now() - Duration::hours(1));
        past.title = "有效标题".into();
        assert!(matches!(
            service.create(&f.teacher, past).await,
            Err(LmsError::ValidationFailed(_))
        ));

        let mut bad_score = create_request(f.class.id, Utc::now() + Duration::days(1));
        bad_score.max_score = 0;
        assert!(matches!(
            service.create(&f.teacher, bad_score).await,
            Err(LmsError::ValidationFailed(_))
        ));

        let missing_class = create_request(9999, Utc::now() + Duration::days(1));
        assert!(matches!(
            service.create(&f.teacher, missing_class).await,
            Err(LmsError::NotFound(_))
        ));
    }
}
