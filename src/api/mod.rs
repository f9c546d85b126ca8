pub mod handlers;
pub mod models;
pub mod openapi;
pub mod rate_limit;

pub use handlers::{AppState, api_routes};
