pub mod auth;
pub mod response;

pub use auth::{principal_middleware, Principal};
pub use response::{ApiResponse, ApiResult};
