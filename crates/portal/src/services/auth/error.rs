//! Authentication error types.

use thiserror::Error;

use eyeopener_core::ValidationError;

use crate::supabase::SupabaseError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A form field failed validation; nothing was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The provider refused the request with a user-facing reason.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The refresh token is no longer valid.
    #[error("session expired")]
    SessionExpired,

    /// The provider could not be reached or answered unexpectedly.
    #[error("provider error: {0}")]
    Provider(#[from] SupabaseError),
}

impl AuthError {
    /// Message safe to show in the notice banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::UserAlreadyExists => "An account with this email already exists".to_string(),
            Self::Rejected(msg) => msg.clone(),
            Self::SessionExpired => "Your session has expired, please sign in again".to_string(),
            Self::Provider(_) => "Authentication service unavailable, please try again".to_string(),
        }
    }
}
