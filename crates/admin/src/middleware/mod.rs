//! HTTP middleware for admin.
//!
//! - `session` - tower-sessions layer over the active session store
//! - `auth` - `RequireAuth` / `OptionalAuth` extractors and session helpers

pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
