//! 班级级别的访问检查
//!
//! 全局角色由 `RequireRole` 中间件把关，这里判断调用者与具体班级的关系。

use crate::errors::{LmsError, Result};
use crate::models::classes::entities::Class;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

/// 获取班级，不存在时返回 NotFound
pub(crate) async fn load_class(storage: &dyn Storage, class_id: i64) -> Result<Class> {
    storage
        .get_class_by_id(class_id)
        .await?
        .ok_or_else(|| LmsError::not_found("班级不存在"))
}

/// 调用者能否访问该班级：管理员总是可以，教师需授课，学生需已选课
pub(crate) async fn ensure_class_access(
    storage: &dyn Storage,
    user: &User,
    class_id: i64,
) -> Result<()> {
    let allowed = match user.role {
        UserRole::Admin => true,
        UserRole::Teacher => storage.is_teacher_of_class(user.id, class_id).await?,
        UserRole::Student => storage.is_student_enrolled(user.id, class_id).await?,
    };

    if allowed {
        Ok(())
    } else {
        Err(LmsError::access_denied("您不是该班级成员"))
    }
}

pub(crate) async fn ensure_teacher_of_class(
    storage: &dyn Storage,
    teacher_id: i64,
    class_id: i64,
) -> Result<()> {
    if storage.is_teacher_of_class(teacher_id, class_id).await? {
        Ok(())
    } else {
        Err(LmsError::access_denied("您不是该班级的授课教师"))
    }
}

pub(crate) async fn ensure_enrolled(
    storage: &dyn Storage,
    student_id: i64,
    class_id: i64,
) -> Result<()> {
    if storage.is_student_enrolled(student_id, class_id).await? {
        Ok(())
    } else {
        Err(LmsError::access_denied("您未加入该班级"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seed_fixture;

    #[tokio::test]
    async fn test_class_access_by_role() {
        let f = seed_fixture().await;
        let storage = f.storage.as_ref();

        assert!(ensure_class_access(storage, &f.admin, f.class.id).await.is_ok());
        assert!(ensure_class_access(storage, &f.teacher, f.class.id).await.is_ok());
        assert!(ensure_class_access(storage, &f.students[0], f.class.id).await.is_ok());
        assert!(matches!(
            ensure_class_access(storage, &f.other_teacher, f.class.id).await,
            Err(LmsError::AccessDenied(_))
        ));
        assert!(matches!(
            ensure_class_access(storage, &f.outsider, f.class.id).await,
            Err(LmsError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_class_is_not_found() {
        let f = seed_fixture().await;
        assert!(matches!(
            load_class(f.storage.as_ref(), 9999).await,
            Err(LmsError::NotFound(_))
        ));
    }
}
