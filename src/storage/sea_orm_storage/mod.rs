//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod classes;
mod notifications;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{LmsError, Result, is_lock_contention};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

/// 将数据库错误转换为业务错误，唯一约束冲突与写锁竞争归类为 Conflict
pub(crate) fn db_error(context: &str, err: DbErr) -> LmsError {
    if is_lock_contention(&err) {
        return LmsError::conflict(format!("{context}: 并发写入冲突，请重试"));
    }
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            LmsError::conflict(format!("{context}: 记录已存在"))
        }
        _ => LmsError::database_operation(format!("{context}: {err}")),
    }
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(
            &config.database.url,
            config.database.pool_size,
            config.database.timeout,
        )
        .await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(&db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| LmsError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（文件库启用 WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| LmsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool_options = if in_memory {
            // 内存库每个连接都是独立的数据库，只能保留唯一一个常驻连接
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            opt = opt
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
            SqlitePoolOptions::new()
                .max_connections(pool_size.max(1))
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(timeout))
            .connect_with(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(LmsError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 当前后端是否支持 SELECT ... FOR UPDATE
    pub(crate) fn supports_row_lock(&self) -> bool {
        use sea_orm::{ConnectionTrait, DatabaseBackend};
        !matches!(self.db.get_database_backend(), DatabaseBackend::Sqlite)
    }
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn list_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.list_users_by_ids_impl(ids).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 班级模块
    async fn create_class(&self, name: &str, subject: Option<&str>) -> Result<Class> {
        self.create_class_impl(name, subject).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_code(&self, enrollment_code: &str) -> Result<Option<Class>> {
        self.get_class_by_code_impl(enrollment_code).await
    }

    async fn list_classes_by_ids(&self, ids: &[i64]) -> Result<Vec<Class>> {
        self.list_classes_by_ids_impl(ids).await
    }

    async fn assign_teacher(&self, teacher_id: i64, class_id: i64) -> Result<()> {
        self.assign_teacher_impl(teacher_id, class_id).await
    }

    async fn enroll_student(&self, student_id: i64, class_id: i64) -> Result<()> {
        self.enroll_student_impl(student_id, class_id).await
    }

    async fn is_teacher_of_class(&self, teacher_id: i64, class_id: i64) -> Result<bool> {
        self.is_teacher_of_class_impl(teacher_id, class_id).await
    }

    async fn is_student_enrolled(&self, student_id: i64, class_id: i64) -> Result<bool> {
        self.is_student_enrolled_impl(student_id, class_id).await
    }

    async fn list_class_student_ids(&self, class_id: i64) -> Result<Vec<i64>> {
        self.list_class_student_ids_impl(class_id).await
    }

    async fn list_student_class_ids(&self, student_id: i64) -> Result<Vec<i64>> {
        self.list_student_class_ids_impl(student_id).await
    }

    async fn list_teacher_class_ids(&self, teacher_id: i64) -> Result<Vec<i64>> {
        self.list_teacher_class_ids_impl(teacher_id).await
    }

    // 作业模块
    async fn create_assignment(
        &self,
        teacher_id: i64,
        req: CreateAssignmentRequest,
    ) -> Result<Assignment> {
        self.create_assignment_impl(teacher_id, req).await
    }

    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(assignment_id).await
    }

    async fn update_assignment(
        &self,
        assignment_id: i64,
        update: UpdateAssignmentRequest,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(assignment_id, update).await
    }

    async fn mark_assignment_published(&self, assignment_id: i64) -> Result<bool> {
        self.mark_assignment_published_impl(assignment_id).await
    }

    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool> {
        self.delete_assignment_impl(assignment_id).await
    }

    async fn list_class_assignments(
        &self,
        class_id: i64,
        view: AssignmentListView,
    ) -> Result<AssignmentListResponse> {
        self.list_class_assignments_impl(class_id, view).await
    }

    async fn list_assignments_for_classes(
        &self,
        class_ids: &[i64],
        statuses: &[AssignmentStatus],
    ) -> Result<Vec<Assignment>> {
        self.list_assignments_for_classes_impl(class_ids, statuses)
            .await
    }

    async fn list_teacher_assignments(&self, teacher_id: i64) -> Result<Vec<Assignment>> {
        self.list_teacher_assignments_impl(teacher_id).await
    }

    async fn list_published_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Assignment>> {
        self.list_published_due_between_impl(from, to).await
    }

    async fn close_expired_assignments(&self, now: DateTime<Utc>) -> Result<u64> {
        self.close_expired_assignments_impl(now).await
    }

    // 提交模块
    async fn create_submission_version(&self, submission: NewSubmission) -> Result<Submission> {
        self.create_submission_version_impl(submission).await
    }

    async fn get_submission_by_id(&self, submission_id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(submission_id).await
    }

    async fn grade_submission(
        &self,
        submission_id: i64,
        score: i32,
        feedback: Option<String>,
        graded_at: DateTime<Utc>,
    ) -> Result<Option<Submission>> {
        self.grade_submission_impl(submission_id, score, feedback, graded_at)
            .await
    }

    async fn list_latest_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>> {
        self.list_latest_submissions_impl(assignment_id).await
    }

    async fn list_latest_submissions_for_assignments(
        &self,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        self.list_latest_submissions_for_assignments_impl(assignment_ids)
            .await
    }

    async fn list_student_latest_submissions(
        &self,
        student_id: i64,
        assignment_ids: &[i64],
    ) -> Result<Vec<Submission>> {
        self.list_student_latest_submissions_impl(student_id, assignment_ids)
            .await
    }

    async fn list_submission_history(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Vec<Submission>> {
        self.list_submission_history_impl(assignment_id, student_id)
            .await
    }

    async fn list_submissions_with_replaced_file(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Submission>> {
        self.list_submissions_with_replaced_file_impl(cutoff).await
    }

    async fn clear_previous_file_url(&self, submission_id: i64) -> Result<()> {
        self.clear_previous_file_url_impl(submission_id).await
    }

    // 通知模块
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        self.create_notification_impl(notification).await
    }

    async fn create_user_notifications(
        &self,
        notification_id: i64,
        user_ids: &[i64],
    ) -> Result<u64> {
        self.create_user_notifications_impl(notification_id, user_ids)
            .await
    }

    async fn get_user_notification(
        &self,
        user_notification_id: i64,
        user_id: i64,
    ) -> Result<Option<UserNotification>> {
        self.get_user_notification_impl(user_notification_id, user_id)
            .await
    }

    async fn mark_user_notification_read(
        &self,
        user_notification_id: i64,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.mark_user_notification_read_impl(user_notification_id, user_id, read_at)
            .await
    }

    async fn mark_all_user_notifications_read(
        &self,
        user_id: i64,
        read_at: DateTime<Utc>,
    ) -> Result<u64> {
        self.mark_all_user_notifications_read_impl(user_id, read_at)
            .await
    }

    async fn count_unread_notifications(&self, user_id: i64) -> Result<i64> {
        self.count_unread_notifications_impl(user_id).await
    }

    async fn list_user_notifications(
        &self,
        user_id: i64,
        query: NotificationListQuery,
        class_id: Option<i64>,
    ) -> Result<NotificationListResponse> {
        self.list_user_notifications_impl(user_id, query, class_id)
            .await
    }

    async fn find_notification_since(
        &self,
        assignment_id: i64,
        notification_type: NotificationType,
        since: DateTime<Utc>,
    ) -> Result<Option<Notification>> {
        self.find_notification_since_impl(assignment_id, notification_type, since)
            .await
    }

    async fn delete_notifications_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.delete_notifications_before_impl(cutoff).await
    }

    async fn notification_stats(&self) -> Result<NotificationStats> {
        self.notification_stats_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("lms.db").ok().as_deref(),
            Some("sqlite://lms.db?mode=rwc")
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").ok().as_deref(),
            Some("sqlite::memory:")
        );
        assert!(SeaOrmStorage::build_database_url("postgres://u@h/db").is_ok());
        assert!(matches!(
            SeaOrmStorage::build_database_url("redis://localhost"),
            Err(LmsError::DatabaseConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_in_memory_runs_migrations() {
        let storage = SeaOrmStorage::connect("sqlite::memory:", 1, 5)
            .await
            .expect("connect");
        assert!(!storage.supports_row_lock());
        assert!(
            storage
                .get_user_by_id(1)
                .await
                .expect("query after migration")
                .is_none()
        );
    }
}
