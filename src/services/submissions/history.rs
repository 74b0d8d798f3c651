use super::SubmissionService;
use crate::errors::Result;
use crate::models::submissions::entities::Submission;
use crate::services::access::ensure_enrolled;

/// 学生在某作业下的全部版本，新版本在前
pub async fn submission_history(
    service: &SubmissionService,
    assignment_id: i64,
    student_id: i64,
) -> Result<Vec<Submission>> {
    let assignment = service.load_assignment(assignment_id).await?;
    let storage = service.get_storage();
    ensure_enrolled(storage, student_id, assignment.class_id).await?;

    storage
        .list_submission_history(assignment_id, student_id)
        .await
}
