//! HTTP request handlers for the SSO service.

pub mod auth_handler;
pub mod health;
pub mod metrics;
pub mod user_handler;

pub use auth_handler::{handle_login, handle_register};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use user_handler::{handle_get_user, handle_is_admin};
