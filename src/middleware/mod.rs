pub mod auth;
pub mod response;

pub use auth::{authenticate, AuthenticatedUser};
pub use response::{ApiResponse, ApiResult};
