//! 作业存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, db_error};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::Result;
use crate::models::assignments::{
    entities::{Assignment, AssignmentListView, AssignmentStatus},
    requests::{CreateAssignmentRequest, UpdateAssignmentRequest},
    responses::{AssignmentListResponse, StudentAssignmentItem, TeacherAssignmentItem},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::Expr,
};

fn status_strings(statuses: &[AssignmentStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.to_string()).collect()
}

impl SeaOrmStorage {
    /// 创建作业，状态固定为草稿
    pub async fn create_assignment_impl(
        &self,
        teacher_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        let now = Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(req.class_id),
            teacher_id: Set(teacher_id),
            title: Set(req.title),
            description: Set(req.description),
            instruction: Set(req.instruction),
            deadline: Set(req.deadline.timestamp()),
            max_score: Set(req.max_score),
            status: Set(AssignmentStatus::Draft.to_string()),
            file_url: Set(req.file_url),
            file_name: Set(req.file_name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| db_error("创建作业失败", e))?;

        Ok(result.into_assignment())
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询作业失败", e))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 更新作业
    pub async fn update_assignment_impl(
        &self,
        assignment_id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        let Some(existing) = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询作业失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(description);
        }
        if let Some(instruction) = update.instruction {
            model.instruction = Set(Some(instruction));
        }
        if let Some(deadline) = update.deadline {
            model.deadline = Set(deadline.timestamp());
        }
        if let Some(max_score) = update.max_score {
            model.max_score = Set(max_score);
        }
        if let Some(file_url) = update.file_url {
            model.file_url = Set(Some(file_url));
        }
        if let Some(file_name) = update.file_name {
            model.file_name = Set(Some(file_name));
        }
        model.updated_at = Set(Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新作业失败", e))?;

        Ok(Some(result.into_assignment()))
    }

    /// 草稿 → 已发布，条件更新保证只有一次调用能成功
    pub async fn mark_assignment_published_impl(&self, assignment_id: i64) -> Result<bool> {
        let result = Assignments::update_many()
            .col_expr(
                Column::Status,
                Expr::value(AssignmentStatus::Published.to_string()),
            )
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now().timestamp()))
            .filter(Column::Id.eq(assignment_id))
            .filter(Column::Status.eq(AssignmentStatus::Draft.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("发布作业失败", e))?;

        Ok(result.rows_affected == 1)
    }

    /// 删除作业（先删除全部提交）
    pub async fn delete_assignment_impl(&self, assignment_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        Submissions::delete_many()
            .filter(SubmissionColumn::AssignmentId.eq(assignment_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除作业提交失败", e))?;

        let result = Assignments::delete_by_id(assignment_id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除作业失败", e))?;

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;

        Ok(result.rows_affected > 0)
    }

    /// 按角色形态列出班级作业
    pub async fn list_class_assignments_impl(
        &self,
        class_id: i64,
        view: AssignmentListView,
    ) -> Result<AssignmentListResponse> {
        let mut select = Assignments::find().filter(Column::ClassId.eq(class_id));

        if let AssignmentListView::ForStudent { .. } = view {
            select = select.filter(
                Column::Status.is_in(status_strings(AssignmentStatus::student_visible())),
            );
        }

        let assignments: Vec<Assignment> = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询班级作业失败", e))?
            .into_iter()
            .map(|m| m.into_assignment())
            .collect();

        let ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();

        match view {
            AssignmentListView::ForTeacher => {
                let counts: HashMap<i64, i64> = if ids.is_empty() {
                    HashMap::new()
                } else {
                    Submissions::find()
                        .select_only()
                        .column(SubmissionColumn::AssignmentId)
                        .column_as(SubmissionColumn::Id.count(), "submission_count")
                        .filter(SubmissionColumn::AssignmentId.is_in(ids))
                        .filter(SubmissionColumn::IsLatest.eq(true))
                        .group_by(SubmissionColumn::AssignmentId)
                        .into_tuple::<(i64, i64)>()
                        .all(&self.db)
                        .await
                        .map_err(|e| db_error("统计作业提交数失败", e))?
                        .into_iter()
                        .collect()
                };

                let items = assignments
                    .into_iter()
                    .map(|assignment| TeacherAssignmentItem {
                        submission_count: counts.get(&assignment.id).copied().unwrap_or(0),
                        assignment,
                    })
                    .collect();

                Ok(AssignmentListResponse::ForTeacher { items })
            }
            AssignmentListView::ForStudent { student_id } => {
                let mut latest: HashMap<i64, _> = self
                    .list_student_latest_submissions_impl(student_id, &ids)
                    .await?
                    .into_iter()
                    .map(|s| (s.assignment_id, s))
                    .collect();

                let items = assignments
                    .into_iter()
                    .map(|assignment| StudentAssignmentItem {
                        my_submission: latest.remove(&assignment.id),
                        assignment,
                    })
                    .collect();

                Ok(AssignmentListResponse::ForStudent { items })
            }
        }
    }

    /// 列出多个班级中指定状态的作业
    pub async fn list_assignments_for_classes_impl(
        &self,
        class_ids: &[i64],
        statuses: &[AssignmentStatus],
    ) -> Result<Vec<Assignment>> {
        if class_ids.is_empty() || statuses.is_empty() {
            return Ok(Vec::new());
        }

        let results = Assignments::find()
            .filter(Column::ClassId.is_in(class_ids.to_vec()))
            .filter(Column::Status.is_in(status_strings(statuses)))
            .order_by_asc(Column::Deadline)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询作业列表失败", e))?;

        Ok(results.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 列出教师创建的全部作业
    pub async fn list_teacher_assignments_impl(&self, teacher_id: i64) -> Result<Vec<Assignment>> {
        let results = Assignments::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询教师作业失败", e))?;

        Ok(results.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 列出截止时间落在 (from, to] 内的已发布作业
    pub async fn list_published_due_between_impl(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Assignment>> {
        let results = Assignments::find()
            .filter(Column::Status.eq(AssignmentStatus::Published.to_string()))
            .filter(Column::Deadline.gt(from.timestamp()))
            .filter(Column::Deadline.lte(to.timestamp()))
            .order_by_asc(Column::Deadline)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询即将截止的作业失败", e))?;

        Ok(results.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 关闭截止时间早于 now 的已发布作业
    pub async fn close_expired_assignments_impl(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = Assignments::update_many()
            .col_expr(
                Column::Status,
                Expr::value(AssignmentStatus::Closed.to_string()),
            )
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now().timestamp()))
            .filter(Column::Status.eq(AssignmentStatus::Published.to_string()))
            .filter(Column::Deadline.lt(now.timestamp()))
            .exec(&self.db)
            .await
            .map_err(|e| db_error("关闭过期作业失败", e))?;

        Ok(result.rows_affected)
    }
}
