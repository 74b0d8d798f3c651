use tracing::info;

use super::AssignmentService;
use crate::errors::{LmsError, Result};

/// 删除作业，连同其全部提交版本一起硬删除
pub async fn delete_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    teacher_id: i64,
) -> Result<()> {
    service.load_owned(assignment_id, teacher_id).await?;

    if !service.get_storage().delete_assignment(assignment_id).await? {
        return Err(LmsError::not_found("作业不存在"));
    }

    info!("Teacher {} deleted assignment {}", teacher_id, assignment_id);
    Ok(())
}
