use tracing::info;

use super::ClassService;
use crate::errors::{LmsError, Result};
use crate::models::classes::entities::Class;
use crate::models::users::entities::User;

/// 学生通过选课码加入班级
pub async fn join_by_code(
    service: &ClassService,
    student: &User,
    enrollment_code: &str,
) -> Result<Class> {
    let code = enrollment_code.trim();
    if code.is_empty() {
        return Err(LmsError::validation_failed("选课码不能为空"));
    }

    let storage = service.get_storage();
    let class = storage
        .get_class_by_code(code)
        .await?
        .ok_or_else(|| LmsError::not_found("选课码无效"))?;

    if storage.is_student_enrolled(student.id, class.id).await? {
        return Err(LmsError::conflict("您已加入该班级"));
    }
    storage.enroll_student(student.id, class.id).await?;

    info!("Student {} joined class {}", student.id, class.id);
    Ok(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seed_fixture;

    #[tokio::test]
    async fn test_join_by_code() {
        let f = seed_fixture().await;
        let service = f.class_service();

        let joined = service
            .join_by_code(&f.outsider, &f.class.enrollment_code)
            .await
            .expect("join");
        assert_eq!(joined.id, f.class.id);
        assert!(
            f.storage
                .is_student_enrolled(f.outsider.id, f.class.id)
                .await
                .expect("check")
        );

        let again = service
            .join_by_code(&f.outsider, &f.class.enrollment_code)
            .await;
        assert!(matches!(again, Err(LmsError::Conflict(_))));

        let unknown = service.join_by_code(&f.outsider, "NOPE0000").await;
        assert!(matches!(unknown, Err(LmsError::NotFound(_))));
    }
}
