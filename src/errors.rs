//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 业务错误在路由层通过 `ResponseError` 统一转换为 `ApiResponse` 响应，
//! HTTP 状态码由错误变体决定，而不是从错误消息中推断。

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::models::{ApiResponse, ErrorCode};

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_lms_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum LmsError {
            $($variant(String),)*
        }

        impl LmsError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(LmsError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(LmsError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(LmsError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl LmsError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        LmsError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_lms_errors! {
    NotFound("E001", "Resource Not Found"),
    AccessDenied("E002", "Access Denied"),
    InvalidState("E003", "Invalid State"),
    ValidationFailed("E004", "Validation Error"),
    Conflict("E005", "Conflict"),
    Authentication("E006", "Authentication Error"),
    DatabaseConfig("E007", "Database Configuration Error"),
    DatabaseConnection("E008", "Database Connection Error"),
    DatabaseOperation("E009", "Database Operation Error"),
    FileOperation("E010", "File Operation Error"),
    Serialization("E011", "Serialization Error"),
}

impl LmsError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 对外暴露的业务错误码
    pub fn error_code(&self) -> ErrorCode {
        match self {
            LmsError::NotFound(_) => ErrorCode::NotFound,
            LmsError::AccessDenied(_) => ErrorCode::Forbidden,
            LmsError::InvalidState(_) => ErrorCode::InvalidState,
            LmsError::ValidationFailed(_) => ErrorCode::ValidationFailed,
            LmsError::Conflict(_) => ErrorCode::Conflict,
            LmsError::Authentication(_) => ErrorCode::Unauthorized,
            LmsError::DatabaseConfig(_)
            | LmsError::DatabaseConnection(_)
            | LmsError::DatabaseOperation(_)
            | LmsError::FileOperation(_)
            | LmsError::Serialization(_) => ErrorCode::InternalServerError,
        }
    }

    /// 是否为基础设施错误（不向调用方暴露细节）
    pub fn is_internal(&self) -> bool {
        self.error_code() == ErrorCode::InternalServerError
    }
}

impl fmt::Display for LmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LmsError {}

impl ResponseError for LmsError {
    fn status_code(&self) -> StatusCode {
        match self {
            LmsError::NotFound(_) => StatusCode::NOT_FOUND,
            LmsError::AccessDenied(_) => StatusCode::FORBIDDEN,
            LmsError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LmsError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            LmsError::Conflict(_) => StatusCode::CONFLICT,
            LmsError::Authentication(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_internal() {
            tracing::error!("{}", self.format_simple());
            "服务器内部错误".to_string()
        } else {
            self.message().to_string()
        };

        HttpResponse::build(self.status_code())
            .json(ApiResponse::<()>::error_empty(self.error_code(), message))
    }
}

/// SQLite 写锁竞争（SQLITE_BUSY / SQLITE_LOCKED 及其扩展码）
pub(crate) fn is_lock_contention(err: &sea_orm::DbErr) -> bool {
    use sea_orm::sqlx::error::DatabaseError;
    use sea_orm::{DbErr, RuntimeErr};

    let (DbErr::Conn(RuntimeErr::SqlxError(e))
    | DbErr::Exec(RuntimeErr::SqlxError(e))
    | DbErr::Query(RuntimeErr::SqlxError(e))) = err
    else {
        return false;
    };

    e.as_database_error()
        .and_then(|db| db.try_downcast_ref::<sea_orm::sqlx::sqlite::SqliteError>())
        .and_then(|sqlite| sqlite.code())
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LmsError {
    fn from(err: sea_orm::DbErr) -> Self {
        if is_lock_contention(&err) {
            return LmsError::Conflict("数据库正忙，请稍后重试".to_string());
        }
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                LmsError::Conflict(detail)
            }
            _ => LmsError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<std::io::Error> for LmsError {
    fn from(err: std::io::Error) -> Self {
        LmsError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LmsError {
    fn from(err: serde_json::Error) -> Self {
        LmsError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LmsError>;
