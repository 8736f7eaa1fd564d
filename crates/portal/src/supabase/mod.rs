//! Supabase HTTP clients.
//!
//! # Architecture
//!
//! - Supabase is the source of truth: no local copies of users or readings
//! - GoTrue (`/auth/v1`) issues sessions; PostgREST (`/rest/v1`) serves rows
//! - Every request carries the project anon key as `apikey`
//! - Data requests carry the signed-in user's access token as the bearer, so
//!   row-level policies apply to everything the portal reads or writes
//!
//! # Example
//!
//! ```rust,ignore
//! use eyeopener_portal::supabase::{RestQuery, SupabaseClient};
//!
//! let client = SupabaseClient::new(&config.supabase);
//! let session = client.sign_in_with_password("seeker@example.com", "hunter22").await?;
//!
//! let query = RestQuery::new().select("*").eq("user_id", &session.user.id);
//! let rows: Vec<Reading> = client.select(&session.access_token, "readings", &query).await?;
//! ```

mod auth;
mod rest;
pub mod types;

pub use rest::RestQuery;
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::SupabaseConfig;

/// Request timeout for every Supabase call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when talking to Supabase.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Supabase answered with a non-success status.
    #[error("Supabase API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl SupabaseError {
    /// HTTP status returned by Supabase, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the access token was rejected.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Error body shapes used by GoTrue and PostgREST.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

// =============================================================================
// SupabaseClient
// =============================================================================

/// Client for one Supabase project.
///
/// Cheap to clone; the HTTP connection pool is shared.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a new client for the configured project.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("eyeopener-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                base_url: config.url.clone(),
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        }
    }

    /// Resolve a path such as `auth/v1/user` against the project URL.
    fn endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Start a request with the `apikey` header and an optional bearer token.
    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let bearer = access_token.unwrap_or(&self.inner.anon_key);
        self.inner
            .client
            .request(method, url)
            .header("apikey", &self.inner.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SupabaseError> {
        let text = self.send_text(request).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse Supabase response"
            );
            SupabaseError::Parse(e)
        })
    }

    /// Send a request, mapping non-success statuses to [`SupabaseError::Api`].
    async fn send_text(&self, request: reqwest::RequestBuilder) -> Result<String, SupabaseError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| text.chars().take(200).collect());
            tracing::debug!(status = %status, message = %message, "Supabase returned an error");
            return Err(SupabaseError::Api { status, message });
        }

        Ok(text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_prefers_description() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.into_message().unwrap(), "Invalid login credentials");
    }

    #[test]
    fn test_error_body_postgrest_shape() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"code":"42501","message":"new row violates row-level security policy","details":null,"hint":null}"#,
        )
        .unwrap();
        assert_eq!(
            body.into_message().unwrap(),
            "new row violates row-level security policy"
        );
    }

    #[test]
    fn test_endpoint_joins_project_url() {
        let config = SupabaseConfig::new("https://abcd.supabase.co", "anon").unwrap();
        let client = SupabaseClient::new(&config);
        let url = client.endpoint("rest/v1/readings").unwrap();
        assert_eq!(url.as_str(), "https://abcd.supabase.co/rest/v1/readings");
    }

    #[test]
    fn test_unauthorized_detection() {
        let err = SupabaseError::Api {
            status: StatusCode::UNAUTHORIZED,
            message: "JWT expired".to_string(),
        };
        assert!(err.is_unauthorized());
    }
}
