pub mod auth;
pub mod response;

pub use auth::{auth_middleware, Principal};
pub use response::{ApiResponse, ApiResult};
