use chrono::{DateTime, Utc};

use super::AssignmentService;
use crate::errors::{LmsError, Result};
use crate::models::assignments::{entities::Assignment, requests::UpdateAssignmentRequest};
use crate::utils::validate;

fn validate_update(req: &UpdateAssignmentRequest, now: DateTime<Utc>) -> Result<()> {
    if let Some(title) = &req.title {
        validate::validate_title(title).map_err(LmsError::validation_failed)?;
    }
    if let Some(description) = &req.description {
        validate::validate_description(description).map_err(LmsError::validation_failed)?;
    }
    if let Some(instruction) = &req.instruction {
        validate::validate_instruction(instruction).map_err(LmsError::validation_failed)?;
    }
    if let Some(max_score) = req.max_score {
        validate::validate_max_score(max_score).map_err(LmsError::validation_failed)?;
    }
    if let Some(deadline) = req.deadline {
        validate::validate_deadline(deadline, now).map_err(LmsError::validation_failed)?;
    }
    Ok(())
}

/// 更新作业字段，任何状态下创建者都可以修改，状态保持不变
///
/// 已有提交的迟交信息不会因为截止时间改变而重新计算。
pub async fn update_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    teacher_id: i64,
    req: UpdateAssignmentRequest,
    now: DateTime<Utc>,
) -> Result<Assignment> {
    let existing = service.load_owned(assignment_id, teacher_id).await?;
    validate_update(&req, now)?;

    if req.is_empty() {
        return Ok(existing);
    }

    service
        .get_storage()
        .update_assignment(assignment_id, req)
        .await?
        .ok_or_else(|| LmsError::not_found("作业不存在"))
}
