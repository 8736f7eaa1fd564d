//! Admin role management commands.
//!
//! # Usage
//!
//! ```bash
//! eo-cli admin promote -e travis@example.com
//! eo-cli admin demote -e travis@example.com
//! ```
//!
//! The user must already have signed up: their profile row is created by the
//! `handle_new_user` trigger, and only its `role` column changes here.
//!
//! # Environment Variables
//!
//! - `SUPABASE_DB_URL` - direct Postgres connection to the Supabase project

use eyeopener_core::{Email, Role, UserId};
use thiserror::Error;

use super::{SUPABASE_DB_URL, connect, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No profile for this email.
    #[error("No profile found for email: {0}. The user must sign up first.")]
    UnknownUser(String),
}

/// Set the role on the profile owning `email`.
///
/// # Returns
///
/// The user id of the updated profile.
pub async fn set_role(email: &str, role: Role) -> Result<UserId, AdminError> {
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;

    let url = database_url(SUPABASE_DB_URL).ok_or(AdminError::MissingEnvVar(SUPABASE_DB_URL))?;
    let pool = connect(SUPABASE_DB_URL, &url).await?;

    tracing::info!("Setting role for {} to {}", email, role);

    let user_id: Option<UserId> = sqlx::query_scalar(
        r"
        UPDATE public.profiles
        SET role = $2
        WHERE lower(email) = lower($1)
        RETURNING user_id
        ",
    )
    .bind(&email)
    .bind(role.as_str())
    .fetch_optional(&pool)
    .await?;

    let user_id = user_id.ok_or_else(|| AdminError::UnknownUser(email.to_string()))?;

    tracing::info!("Role updated! User: {}, Email: {}, Role: {}", user_id, email, role);
    if !role.is_admin() {
        tracing::warn!("Running portals may keep the old role for up to a minute.");
    }

    Ok(user_id)
}
