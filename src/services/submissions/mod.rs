//! 提交引擎
//!
//! 每次提交都是一个新版本，同一学生同一作业任意时刻最多只有一个最新版本。

pub mod cleanup;
pub mod grade;
pub mod history;
pub mod lateness;
pub mod list;
pub mod submit;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::errors::{LmsError, Result};
use crate::models::assignments::entities::Assignment;
use crate::models::submissions::{
    entities::Submission,
    requests::{GradeSubmissionRequest, SubmitAssignmentRequest},
    responses::{SubmissionWithStudent, SubmitResponse},
};
use crate::models::users::entities::User;
use crate::services::files::FileStorage;
use crate::storage::Storage;

pub use cleanup::ReplacedFileCleanup;
pub use lateness::compute_lateness;

#[derive(Clone)]
pub struct SubmissionService {
    storage: Arc<dyn Storage>,
    files: Arc<dyn FileStorage>,
}

impl SubmissionService {
    pub fn new(storage: Arc<dyn Storage>, files: Arc<dyn FileStorage>) -> Self {
        Self { storage, files }
    }

    pub(crate) fn get_storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub(crate) async fn load_assignment(&self, assignment_id: i64) -> Result<Assignment> {
        self.storage
            .get_assignment_by_id(assignment_id)
            .await?
            .ok_or_else(|| LmsError::not_found("作业不存在"))
    }

    pub async fn submit(
        &self,
        assignment_id: i64,
        student: &User,
        req: SubmitAssignmentRequest,
    ) -> Result<SubmitResponse> {
        submit::submit_assignment(self, assignment_id, student, req, Utc::now()).await
    }

    pub async fn grade(
        &self,
        submission_id: i64,
        teacher_id: i64,
        req: GradeSubmissionRequest,
    ) -> Result<Submission> {
        grade::grade_submission(self, submission_id, teacher_id, req, Utc::now()).await
    }

    pub async fn list_for_assignment(
        &self,
        assignment_id: i64,
        teacher_id: i64,
    ) -> Result<Vec<SubmissionWithStudent>> {
        list::list_for_assignment(self, assignment_id, teacher_id).await
    }

    pub async fn history(&self, assignment_id: i64, student_id: i64) -> Result<Vec<Submission>> {
        history::submission_history(self, assignment_id, student_id).await
    }

    pub async fn cleanup_replaced_files(
        &self,
        now: DateTime<Utc>,
        grace_hours: i64,
    ) -> Result<ReplacedFileCleanup> {
        cleanup::cleanup_replaced_files(self, now, grace_hours).await
    }
}
