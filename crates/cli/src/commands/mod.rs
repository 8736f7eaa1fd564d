//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

/// Direct Postgres connection string for the Supabase project.
pub const SUPABASE_DB_URL: &str = "SUPABASE_DB_URL";

/// Connection string for the portal's session database.
pub const PORTAL_DATABASE_URL: &str = "PORTAL_DATABASE_URL";

/// Read a connection string from the environment, falling back to
/// `DATABASE_URL` when the specific variable is unset.
pub fn database_url(key: &'static str) -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var(key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

/// Connect to the database named by `key`.
pub async fn connect(key: &'static str, url: &SecretString) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Connecting to database ({key})...");
    PgPool::connect(url.expose_secret()).await
}
