//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Supabase schema: reading_type enum, profiles, readings, triggers, RLS
//! eo-cli migrate supabase
//!
//! # Session table used by the portal's PostgresStore
//! eo-cli migrate sessions
//!
//! # Both
//! eo-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_DB_URL` - direct Postgres connection to the Supabase project
//! - `PORTAL_DATABASE_URL` - session database
//!
//! Either falls back to `DATABASE_URL`.
//!
//! # Migration Files
//!
//! Supabase migrations live in `crates/portal/migrations/`. They reference the
//! `auth` schema, so they only apply to a Supabase database.

use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use super::{PORTAL_DATABASE_URL, SUPABASE_DB_URL, connect, database_url};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply the schema and row-level policies to the Supabase database.
pub async fn supabase() -> Result<(), MigrationError> {
    let url = database_url(SUPABASE_DB_URL).ok_or(MigrationError::MissingEnvVar(SUPABASE_DB_URL))?;
    let pool = connect(SUPABASE_DB_URL, &url).await?;

    tracing::info!("Running Supabase migrations...");
    sqlx::migrate!("../portal/migrations").run(&pool).await?;

    tracing::info!("Supabase migrations complete!");
    Ok(())
}

/// Create the session table in the portal database.
pub async fn sessions() -> Result<(), MigrationError> {
    let url = database_url(PORTAL_DATABASE_URL)
        .ok_or(MigrationError::MissingEnvVar(PORTAL_DATABASE_URL))?;
    let pool = connect(PORTAL_DATABASE_URL, &url).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session table ready!");
    Ok(())
}
