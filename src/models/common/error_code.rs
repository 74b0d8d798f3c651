// 业务错误码，响应中以 i32 形式输出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    ValidationFailed = 1022,
    InvalidState = 1023,
    InternalServerError = 1500,
}
