//! Session middleware configuration for admin.
//!
//! Sessions live in whichever store the storage backend provides
//! ([`SessionBackend`]). Cookies are `HttpOnly`, `SameSite=Lax` and expire
//! after 24 hours of inactivity.

use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::AdminConfig;
use crate::db::SessionBackend;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "km_admin_session";

/// Session inactivity expiry in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer over the backend's session store.
#[must_use]
pub fn create_session_layer(
    store: SessionBackend,
    config: &AdminConfig,
) -> SessionManagerLayer<SessionBackend> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
