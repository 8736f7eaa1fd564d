//! Session middleware configuration.
//!
//! Provider tokens live server-side; the browser only holds the session id.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::PortalConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "eo_session";

/// Session expiry time in seconds (7 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over any store.
///
/// Production passes a `PostgresStore`; tests pass a `MemoryStore`.
#[must_use]
pub fn create_session_layer<Store: SessionStore + Clone>(
    store: Store,
    config: &PortalConfig,
) -> SessionManagerLayer<Store> {
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

/// Create the session layer backed by the portal's `PostgreSQL` database.
///
/// The `tower_sessions` table is created by `eo-cli migrate sessions`.
#[must_use]
pub fn postgres_session_layer(
    pool: &PgPool,
    config: &PortalConfig,
) -> SessionManagerLayer<PostgresStore> {
    create_session_layer(PostgresStore::new(pool.clone()), config)
}
