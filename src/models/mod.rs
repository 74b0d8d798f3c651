//! 业务数据模型
//!
//! 与 `entity` 模块中的数据库实体分离，所有对外类型都通过 ts-rs 导出。

pub mod assignments;
pub mod classes;
pub mod common;
pub mod notifications;
pub mod reports;
pub mod submissions;
pub mod users;

pub use common::{
    ApiResponse, ErrorCode, MAX_PAGE, PaginatedResponse, PaginationInfo, PaginationQuery,
};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
