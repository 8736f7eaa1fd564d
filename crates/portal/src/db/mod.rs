//! Data access for the portal.
//!
//! # Stores
//!
//! Application data lives in the hosted Supabase project and is reached
//! through PostgREST with the signed-in user's token:
//!
//! - `profiles` - One row per registered user (role, name, email)
//! - `readings` - Reading records owned by a user
//!
//! The portal's own `PostgreSQL` database only holds the `tower_sessions`
//! session table. Both schemas are created by the CLI:
//! ```bash
//! cargo run -p eyeopener-cli -- migrate all
//! ```
//!
//! # Authorization
//!
//! Row-level policies in Supabase are the primary guard. Repositories repeat
//! the ownership rules for their [`Principal`] and refuse a forbidden call
//! before it reaches the network.

pub mod profiles;
pub mod readings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use eyeopener_core::{ContentError, UserId};

use crate::supabase::SupabaseError;

pub use profiles::ProfileRepository;
pub use readings::ReadingRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The Supabase call failed.
    #[error("supabase error: {0}")]
    Supabase(#[from] SupabaseError),

    /// The principal may not perform this operation.
    #[error("forbidden")]
    Forbidden,

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Reading content could not be turned into a document.
    #[error("invalid content: {0}")]
    InvalidContent(#[from] ContentError),

    /// The store answered with something other than what was asked for.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Whether Supabase rejected the access token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Supabase(e) if e.is_unauthorized())
    }
}

/// The signed-in identity a repository acts for.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct Principal {
    pub user_id: UserId,
    pub is_admin: bool,
    pub access_token: String,
}

impl Principal {
    /// Whether this principal may read `owner`'s readings.
    #[must_use]
    pub fn can_read(&self, owner: UserId) -> bool {
        self.is_admin || self.user_id == owner
    }

    fn require_admin(&self) -> Result<(), RepositoryError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(RepositoryError::Forbidden)
        }
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .field("is_admin", &self.is_admin)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Create the `PostgreSQL` pool backing the session store.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
