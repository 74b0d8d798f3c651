use chrono::{DateTime, Utc};
use tracing::info;

use super::SubmissionService;
use crate::errors::{LmsError, Result};
use crate::models::submissions::{entities::Submission, requests::GradeSubmissionRequest};
use crate::utils::validate;

/// 批改提交
///
/// 只有作业创建者可以批改；重复批改覆盖分数与评语，版本号不变。
pub async fn grade_submission(
    service: &SubmissionService,
    submission_id: i64,
    teacher_id: i64,
    req: GradeSubmissionRequest,
    now: DateTime<Utc>,
) -> Result<Submission> {
    let storage = service.get_storage();
    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| LmsError::not_found("提交不存在"))?;

    let assignment = service.load_assignment(submission.assignment_id).await?;
    if !assignment.is_owned_by(teacher_id) {
        return Err(LmsError::access_denied("只能批改自己作业下的提交"));
    }

    validate::validate_score(req.score, assignment.max_score)
        .map_err(LmsError::validation_failed)?;
    if let Some(feedback) = &req.feedback {
        validate::validate_feedback(feedback).map_err(LmsError::validation_failed)?;
    }

    let graded = storage
        .grade_submission(submission_id, req.score, req.feedback, now)
        .await?
        .ok_or_else(|| LmsError::not_found("提交不存在"))?;

    info!(
        "Teacher {} graded submission {} with score {}",
        teacher_id, submission_id, req.score
    );
    Ok(graded)
}
