//! 提交存储操作
//!
//! 每次提交写入一个新版本，旧的最新版本在同一事务内被降级。

use super::{SeaOrmStorage, db_error};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::Result;
use crate::models::submissions::entities::{NewSubmission, Submission, SubmissionStatus};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::Expr,
};

impl SeaOrmStorage {
    /// 创建新的提交版本
    pub async fn create_submission_version_impl(
        &self,
        submission: NewSubmission,
    ) -> Result<Submission> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        let mut latest_query = Submissions::find()
            .filter(Column::AssignmentId.eq(submission.assignment_id))
            .filter(Column::StudentId.eq(submission.student_id))
            .filter(Column::IsLatest.eq(true));
        if self.supports_row_lock() {
            latest_query = latest_query.lock_exclusive();
        } else {
            // SQLite 没有行锁：先写一次取得库级写锁，其余写者在 busy_timeout 内排队
            Submissions::update_many()
                .col_expr(Column::IsLatest, Expr::col(Column::IsLatest).into())
                .filter(Column::AssignmentId.eq(submission.assignment_id))
                .filter(Column::StudentId.eq(submission.student_id))
                .exec(&txn)
                .await
                .map_err(|e| db_error("获取写锁失败", e))?;
        }

        let previous = latest_query
            .one(&txn)
            .await
            .map_err(|e| db_error("查询最新提交失败", e))?;

        let (version, previous_file_url) = match previous {
            Some(prev) => {
                Submissions::update_many()
                    .col_expr(Column::IsLatest, Expr::value(false))
                    .filter(Column::Id.eq(prev.id))
                    .exec(&txn)
                    .await
                    .map_err(|e| db_error("更新旧版本失败", e))?;

                // 旧版本的文件引用交给后台清理
                (prev.version + 1, prev.file_url)
            }
            None => (1, None),
        };

        let model = ActiveModel {
            assignment_id: Set(submission.assignment_id),
            student_id: Set(submission.student_id),
            version: Set(version),
            content: Set(submission.content),
            file_url: Set(submission.file_url),
            file_name: Set(submission.file_name),
            file_size: Set(submission.file_size),
            mime_type: Set(submission.mime_type),
            is_latest: Set(true),
            is_late: Set(submission.lateness.is_late),
            late_by_minutes: Set(submission.lateness.late_by_minutes),
            status: Set(SubmissionStatus::Submitted.to_string()),
            score: Set(None),
            feedback: Set(None),
            graded_at: Set(None),
            previous_file_url: Set(previous_file_url),
            submitted_at: Set(submission.submitted_at.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&txn)
            .await
            .map_err(|e| db_error("创建提交失败", e))?;

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;

        Ok(result.into_submission())
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, submission_id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询提交失败", e))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 评分
    pub async fn grade_submission_impl(
        &self,
        submission_id: i64,
        score: i32,
        feedback: Option<String>,
        graded_at: DateTime<Utc>,
    ) -> Result<Option<Submission>> {
        let Some(existing) = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询提交失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.score = Set(Some(score));
        model.feedback = Set(feedback);
        model.status = Set(SubmissionStatus::Graded.to_string());
        model.graded_at = Set(Some(graded_at.timestamp()));

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("评分失败", e))?;

        Ok(Some(result.into_submission()))
    }

    /// 作业下每个学生的最新版本
    pub async fn list_latest_submissions_impl(&self, assignment_id: i64) -> Result<Vec<Submission>> {
        let results = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::IsLatest.eq(true))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询作业提交失败", e))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 多个作业的最新版本
    pub async fn list_latest_submissions_for_assignments_impl(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = Submissions::find()
            .filter(Column::AssignmentId.is_in(assignment_ids.to_vec()))
            .filter(Column::IsLatest.eq(true))
            .order_by_asc(Column::AssignmentId)
            .order_by_desc(Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| db_error("批量查询作业提交失败", e))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 某学生在给定作业上的最新版本
    pub async fn list_student_latest_submissions_impl(
        &self,
        student_id: i64,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::AssignmentId.is_in(assignment_ids.to_vec()))
            .filter(Column::IsLatest.eq(true))
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询学生提交失败", e))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 某学生在某作业上的全部版本，新版本在前
    pub async fn list_submission_history_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Vec<Submission>> {
        let results = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::Version)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询提交历史失败", e))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 早于 cutoff 且仍挂着被替换文件的提交
    pub async fn list_submissions_with_replaced_file_impl(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Submission>> {
        let results = Submissions::find()
            .filter(Column::PreviousFileUrl.is_not_null())
            .filter(Column::SubmittedAt.lt(cutoff.timestamp()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询待清理文件失败", e))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    pub async fn clear_previous_file_url_impl(&self, submission_id: i64) -> Result<()> {
        Submissions::update_many()
            .col_expr(Column::PreviousFileUrl, Expr::value(Option::<String>::None))
            .filter(Column::Id.eq(submission_id))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("清除旧文件记录失败", e))?;

        Ok(())
    }
}
