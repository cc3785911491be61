//! Shared HTTP plumbing: response envelope, error mapping, extractors

pub mod error;
pub mod response;
pub mod validated_json;

pub use error::{ApiError, ErrorCode};
pub use response::{ApiResponse, EmptyData, PageQuery, PaginatedResponse};
pub use validated_json::ValidatedJson;
