//! Session-related types.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use eyeopener_core::UserId;

use crate::supabase::AuthSession;

/// Refresh the access token when it expires within this window.
pub const REFRESH_MARGIN_SECONDS: i64 = 60;

/// Session-stored user identity and provider tokens.
///
/// Implements `Debug` manually so tokens never reach the logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Supabase user id.
    pub id: UserId,
    /// Email the user signed in with.
    pub email: String,
    /// Name from the sign-up metadata.
    pub full_name: Option<String>,
    /// Bearer token for GoTrue and PostgREST calls.
    pub access_token: String,
    /// Token used to obtain a new access token.
    pub refresh_token: String,
    /// When `access_token` stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    /// Build the session record from a freshly issued provider session.
    #[must_use]
    pub fn from_auth_session(session: &AuthSession, now: DateTime<Utc>) -> Self {
        Self {
            id: session.user.id,
            email: session.user.email.clone().unwrap_or_default(),
            full_name: session.user.full_name().map(str::to_owned),
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at_utc(now),
        }
    }

    /// Whether the access token should be refreshed before use.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= Duration::seconds(REFRESH_MARGIN_SECONDS)
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
