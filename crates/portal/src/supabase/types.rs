//! Wire types for GoTrue and PostgREST.

use chrono::{DateTime, Utc};
use eyeopener_core::{ReadingType, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// GoTrue
// =============================================================================

/// A user as returned by GoTrue.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// `full_name` from the metadata supplied at sign-up.
    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.user_metadata
            .get("full_name")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// A session issued by GoTrue.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    /// Unix timestamp at which the access token expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Expiry instant, derived from `expires_in` when `expires_at` is absent.
    #[must_use]
    pub fn expires_at_utc(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| now + chrono::Duration::seconds(self.expires_in))
    }
}

/// Result of a sign-up request.
///
/// With email confirmation enabled GoTrue answers with the bare user and no
/// session.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpOutcome {
    SignedIn(Box<AuthSession>),
    ConfirmationPending(AuthUser),
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignUpMetadata<'a> {
    pub full_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

// =============================================================================
// PostgREST bodies
// =============================================================================

/// Body of an insert into `public.readings`.
#[derive(Debug, Clone, Serialize)]
pub struct NewReadingRow {
    pub user_id: UserId,
    pub reading_type: ReadingType,
    pub title: String,
    pub content: Value,
}

/// Body of a partial update of `public.readings`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_type: Option<ReadingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl ReadingPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.reading_type.is_none() && self.content.is_none()
    }
}
