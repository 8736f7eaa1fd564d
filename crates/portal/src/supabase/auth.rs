//! GoTrue endpoints (`/auth/v1`).

use reqwest::Method;
use tracing::instrument;

use super::types::{
    AuthSession, PasswordCredentials, RefreshRequest, SignUpMetadata, SignUpOutcome,
    SignUpRequest,
};
use super::{SupabaseClient, SupabaseError};

impl SupabaseClient {
    /// Build `/auth/v1/token?grant_type=...`.
    fn token_endpoint(&self, grant_type: &str) -> Result<url::Url, SupabaseError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` (status 400) for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let url = self.token_endpoint("password")?;
        let request = self
            .request(Method::POST, url, None)
            .json(&PasswordCredentials { email, password });
        self.send_json(request).await
    }

    /// Register a new user, storing `full_name` in the user metadata.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` when GoTrue rejects the registration
    /// (e.g. the email is already taken).
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, SupabaseError> {
        let url = self.endpoint("auth/v1/signup")?;
        let request = self.request(Method::POST, url, None).json(&SignUpRequest {
            email,
            password,
            data: SignUpMetadata { full_name },
        });
        self.send_json(request).await
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` when the refresh token is invalid or used.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError> {
        let url = self.token_endpoint("refresh_token")?;
        let request = self
            .request(Method::POST, url, None)
            .json(&RefreshRequest { refresh_token });
        self.send_json(request).await
    }

    /// Revoke the session behind an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.endpoint("auth/v1/logout")?;
        self.send_text(self.request(Method::POST, url, Some(access_token)))
            .await
            .map(drop)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SupabaseConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER_ID: &str = "6f1c1f8e-2f47-4c52-9a3b-4f2d2b8e9c10";

    fn session_body() -> serde_json::Value {
        json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "token_type": "bearer",
            "user": {"id": USER_ID, "email": "seeker@example.com", "user_metadata": {"full_name": "Seeker"}}
        })
    }

    fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&SupabaseConfig::new(&server.uri(), "anon-key").unwrap())
    }

    #[tokio::test]
    async fn test_sign_in_with_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({"email": "seeker@example.com", "password": "hunter22"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server)
            .sign_in_with_password("seeker@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(session.access_token, "access-1");
        assert_eq!(session.user.id.to_string(), USER_ID);
    }

    #[tokio::test]
    async fn test_sign_in_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .sign_in_with_password("seeker@example.com", "wrong-pass")
            .await
            .unwrap_err();
        match err {
            SupabaseError::Api { status, message } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(message, "Invalid login credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sign_up_sends_full_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_json(json!({
                "email": "seeker@example.com",
                "password": "hunter22",
                "data": {"full_name": "Seeker"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": USER_ID, "email": "seeker@example.com"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client(&server)
            .sign_up("seeker@example.com", "hunter22", "Seeker")
            .await
            .unwrap();
        assert!(matches!(outcome, SignUpOutcome::ConfirmationPending(_)));
    }

    #[tokio::test]
    async fn test_refresh_and_sign_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(body_json(json!({"refresh_token": "refresh-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let session = client.refresh_session("refresh-1").await.unwrap();
        client.sign_out(&session.access_token).await.unwrap();
    }
}
