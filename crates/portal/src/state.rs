//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use eyeopener_core::UserId;

use crate::config::PortalConfig;
use crate::supabase::SupabaseClient;

/// How long a resolved admin flag is trusted before the profile is re-read.
const ADMIN_FLAG_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the Supabase client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    pool: PgPool,
    supabase: SupabaseClient,
    admin_flags: Cache<UserId, bool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Portal configuration
    /// * `pool` - `PostgreSQL` pool for the session store and readiness probe
    #[must_use]
    pub fn new(config: PortalConfig, pool: PgPool) -> Self {
        let supabase = SupabaseClient::new(&config.supabase);
        let admin_flags = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ADMIN_FLAG_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                supabase,
                admin_flags,
            }),
        }
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Supabase client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Per-user admin flags resolved from `profiles.role`.
    #[must_use]
    pub fn admin_flags(&self) -> &Cache<UserId, bool> {
        &self.inner.admin_flags
    }
}
