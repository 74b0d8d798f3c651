//! 作业生命周期
//!
//! 草稿 → 已发布（仅一次，触发通知）→ 已关闭（由调度器在截止后执行）。

pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod publish;
pub mod update;

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::errors::{LmsError, Result};
use crate::models::assignments::{
    entities::Assignment,
    requests::{CreateAssignmentRequest, UpdateAssignmentRequest},
    responses::{AssignmentDetailResponse, AssignmentListResponse, AssignmentWithContext},
};
use crate::models::users::entities::User;
use crate::services::NotificationService;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AssignmentService {
    storage: Arc<dyn Storage>,
    notifications: NotificationService,
}

impl AssignmentService {
    pub fn new(storage: Arc<dyn Storage>, notifications: NotificationService) -> Self {
        Self {
            storage,
            notifications,
        }
    }

    pub(crate) fn get_storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// 加载作业并确认调用者是创建者
    pub(crate) async fn load_owned(&self, assignment_id: i64, teacher_id: i64) -> Result<Assignment> {
        let assignment = self
            .storage
            .get_assignment_by_id(assignment_id)
            .await?
            .ok_or_else(|| LmsError::not_found("作业不存在"))?;

        if !assignment.is_owned_by(teacher_id) {
            return Err(LmsError::access_denied("只能操作自己创建的作业"));
        }
        Ok(assignment)
    }

    pub async fn create(
        &self,
        teacher: &User,
        req: CreateAssignmentRequest,
    ) -> Result<AssignmentWithContext> {
        create::create_assignment(self, teacher, req, Utc::now()).await
    }

    pub async fn update(
        &self,
        assignment_id: i64,
        teacher_id: i64,
        req: UpdateAssignmentRequest,
    ) -> Result<Assignment> {
        update::update_assignment(self, assignment_id, teacher_id, req, Utc::now()).await
    }

    pub async fn publish(&self, assignment_id: i64, teacher_id: i64) -> Result<Assignment> {
        publish::publish_assignment(self, assignment_id, teacher_id).await
    }

    pub async fn delete(&self, assignment_id: i64, teacher_id: i64) -> Result<()> {
        delete::delete_assignment(self, assignment_id, teacher_id).await
    }

    pub async fn list_for_class(&self, class_id: i64, caller: &User) -> Result<AssignmentListResponse> {
        list::list_class_assignments(self, class_id, caller).await
    }

    pub async fn get_detail(
        &self,
        assignment_id: i64,
        caller: &User,
    ) -> Result<AssignmentDetailResponse> {
        detail::get_assignment_detail(self, assignment_id, caller).await
    }

    /// 关闭已过截止时间的作业，`grace_hours` 之内仍保持开放
    pub async fn close_expired(&self, now: DateTime<Utc>, grace_hours: i64) -> Result<u64> {
        let cutoff = now - chrono::Duration::hours(grace_hours.max(0));
        let closed = self.storage.close_expired_assignments(cutoff).await?;
        if closed > 0 {
            tracing::info!("Closed {} expired assignment(s)", closed);
        }
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::AssignmentStatus;
    use crate::test_utils::seed_fixture;
    use chrono::Duration;

    #[tokio::test]
    async fn test_close_expired_only_touches_published_past_deadline() {
        let f = seed_fixture().await;
        let now = Utc::now();
        let expired = f.published_assignment(now - Duration::hours(2)).await;
        let open = f.published_assignment(now + Duration::hours(2)).await;
        let draft = f.draft_assignment(now - Duration::hours(2)).await;

        let service = f.assignment_service();
        // 宽限期内不关闭
        assert_eq!(service.close_expired(now, 3).await.expect("close"), 0);
        assert_eq!(service.close_expired(now, 0).await.expect("close"), 1);

        let status = |id| {
            let storage = f.storage.clone();
            async move {
                storage
                    .get_assignment_by_id(id)
                    .await
                    .expect("get")
                    .expect("exists")
                    .status
            }
        };
        assert_eq!(status(expired.id).await, AssignmentStatus::Closed);
        assert_eq!(status(open.id).await, AssignmentStatus::Published);
        assert_eq!(status(draft.id).await, AssignmentStatus::Draft);
    }
}
