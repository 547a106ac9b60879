pub mod auth;
pub mod response;
pub mod session;

pub use auth::require_auth;
pub use response::{ApiResponse, ApiResult};
pub use session::create_session_layer;
