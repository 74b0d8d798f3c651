pub mod error_code;
pub mod pagination;
pub mod response;

pub use error_code::ErrorCode;
pub use pagination::{MAX_PAGE, PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
