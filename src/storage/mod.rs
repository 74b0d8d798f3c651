use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::{
    assignments::{
        entities::{Assignment, AssignmentListView, AssignmentStatus},
        requests::{CreateAssignmentRequest, UpdateAssignmentRequest},
        responses::AssignmentListResponse,
    },
    classes::entities::Class,
    notifications::{
        entities::{NewNotification, Notification, NotificationType, UserNotification},
        requests::NotificationListQuery,
        responses::{NotificationListResponse, NotificationStats},
    },
    submissions::entities::{NewSubmission, Submission},
    users::entities::{NewUser, User},
};

use crate::errors::Result;

pub mod sea_orm_storage;

pub use sea_orm_storage::SeaOrmStorage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: NewUser) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 批量获取用户
    async fn list_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;

    /// 班级与成员关系方法
    // 创建班级（自动生成唯一选课码）
    async fn create_class(&self, name: &str, subject: Option<&str>) -> Result<Class>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    // 通过选课码获取班级信息
    async fn get_class_by_code(&self, enrollment_code: &str) -> Result<Option<Class>>;
    // 批量获取班级
    async fn list_classes_by_ids(&self, ids: &[i64]) -> Result<Vec<Class>>;
    // 指派教师到班级
    async fn assign_teacher(&self, teacher_id: i64, class_id: i64) -> Result<()>;
    // 学生选课，重复选课返回 Conflict
    async fn enroll_student(&self, student_id: i64, class_id: i64) -> Result<()>;
    // 教师是否授课于该班级
    async fn is_teacher_of_class(&self, teacher_id: i64, class_id: i64) -> Result<bool>;
    // 学生是否已选该班级
    async fn is_student_enrolled(&self, student_id: i64, class_id: i64) -> Result<bool>;
    // 班级当前的全部学生ID（实时查询）
    async fn list_class_student_ids(&self, class_id: i64) -> Result<Vec<i64>>;
    // 学生所选的全部班级ID
    async fn list_student_class_ids(&self, student_id: i64) -> Result<Vec<i64>>;
    // 教师授课的全部班级ID
    async fn list_teacher_class_ids(&self, teacher_id: i64) -> Result<Vec<i64>>;

    /// 作业管理方法
    // 创建作业（总是草稿）
    async fn create_assignment(
        &self,
        teacher_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment>;
    // 通过ID获取作业
    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>>;
    // 更新作业字段，不改变状态
    async fn update_assignment(
        &self,
        assignment_id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>>;
    // 仅当作业仍为草稿时切换为已发布，返回是否切换成功
    async fn mark_assignment_published(&self, assignment_id: i64) -> Result<bool>;
    // 删除作业及其全部提交
    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool>;
    // 按角色形态列出班级作业
    async fn list_class_assignments(
        &self,
        class_id: i64,
        view: AssignmentListView,
    ) -> Result<AssignmentListResponse>;
    // 列出多个班级中指定状态的作业
    async fn list_assignments_for_classes(
        &self,
        class_ids: &[i64],
        statuses: &[AssignmentStatus],
    ) -> Result<Vec<Assignment>>;
    // 列出教师创建的全部作业
    async fn list_teacher_assignments(&self, teacher_id: i64) -> Result<Vec<Assignment>>;
    // 列出截止时间落在 (from, to] 内的已发布作业
    async fn list_published_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Assignment>>;
    // 关闭已过截止时间的已发布作业
    async fn close_expired_assignments(&self, now: DateTime<Utc>) -> Result<u64>;

    /// 提交管理方法
    // 在同一事务内退役旧的最新版本并写入新版本
    async fn create_submission_version(&self, submission: NewSubmission) -> Result<Submission>;
    // 通过ID获取提交
    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<Submission>>;
    // 批改（不产生新版本）
    async fn grade_submission(
        &self,
        submission_id: i64,
        score: i32,
        feedback: Option<String>,
        graded_at: DateTime<Utc>,
    ) -> Result<Option<Submission>>;
    // 作业的全部最新提交，按提交时间倒序
    async fn list_latest_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>>;
    // 多个作业的全部最新提交
    async fn list_latest_submissions_for_assignments(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>>;
    // 学生在指定作业中的最新提交
    async fn list_student_latest_submissions(
        &self,
        student_id: i64,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>>;
    // 学生某作业的全部版本，按版本号倒序
    async fn list_submission_history(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Vec<Submission>>;
    // 替换旧文件且早于 cutoff 的提交
    async fn list_submissions_with_replaced_file(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Submission>>;
    // 清除已处理的旧文件引用
    async fn clear_previous_file_url(&self, submission_id: i64) -> Result<()>;

    /// 通知管理方法
    // 创建共享通知
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification>;
    // 为每个接收者创建投递记录，返回创建数量
    async fn create_user_notifications(
        &self,
        notification_id: i64,
        user_ids: &[i64],
    ) -> Result<u64>;
    // 获取属于该用户的投递记录
    async fn get_user_notification(
        &self,
        user_notification_id: i64,
        user_id: i64,
    ) -> Result<Option<UserNotification>>;
    // 标记单条为已读（仅对未读生效）
    async fn mark_user_notification_read(
        &self,
        user_notification_id: i64,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<bool>;
    // 标记用户全部未读为已读
    async fn mark_all_user_notifications_read(
        &self,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<u64>;
    // 未读数量
    async fn count_unread_notifications(&self, user_id: i64) -> Result<i64>;
    // 列出用户通知（分页，可按类型与班级筛选）
    async fn list_user_notifications(
        &self,
        user_id: i64,
        query: NotificationListQuery,
        class_id: Option<i64>,
    ) -> Result<NotificationListResponse>;
    // 查找某作业在 since 之后创建的指定类型通知
    async fn find_notification_since(
        &self,
        assignment_id: i64,
        notification_type: NotificationType,
        since: DateTime<Utc>,
    ) -> Result<Option<Notification>>;
    // 删除早于 cutoff 的通知及其投递记录
    async fn delete_notifications_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
    // 通知统计
    async fn notification_stats(&self) -> Result<NotificationStats>;
}

/// 根据配置创建存储实例
pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
