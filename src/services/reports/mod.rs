//! 只读统计：学生作业概览、学生成绩、教师看板

pub mod statistics;
pub mod student;
pub mod teacher;

use chrono::Utc;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::reports::{
    StudentAssignmentsQuery, StudentAssignmentsResponse, StudentGradesResponse,
    TeacherDashboardResponse,
};
use crate::storage::Storage;

pub use statistics::compute_grade_statistics;
pub use student::aggregate_for_student;

#[derive(Clone)]
pub struct ReportService {
    storage: Arc<dyn Storage>,
}

impl ReportService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub(crate) fn get_storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub async fn student_assignments(
        &self,
        student_id: i64,
        query: StudentAssignmentsQuery,
    ) -> Result<StudentAssignmentsResponse> {
        student::student_assignments(self, student_id, query, Utc::now()).await
    }

    pub async fn student_grades(&self, student_id: i64) -> Result<StudentGradesResponse> {
        student::student_grades(self, student_id).await
    }

    pub async fn teacher_dashboard(&self, teacher_id: i64) -> Result<TeacherDashboardResponse> {
        teacher::teacher_dashboard(self, teacher_id).await
    }
}
