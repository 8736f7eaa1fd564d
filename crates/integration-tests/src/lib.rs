//! Integration tests for the Eyeopener portal.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eyeopener-integration-tests
//! ```
//!
//! No services are needed. The full portal router runs in-process with an
//! in-memory session store, and a `wiremock` server stands in for the
//! Supabase project (GoTrue under `/auth/v1`, PostgREST under `/rest/v1`).
//!
//! # Test Categories
//!
//! - `access` - Sign-in gates and admin-only routes
//! - `dashboard` - A client's own readings
//! - `admin_readings` - Creating, editing and deleting readings

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::IpAddr;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use wiremock::matchers::{body_partial_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eyeopener_portal::config::{PortalConfig, SentryConfig, SupabaseConfig};
use eyeopener_portal::state::AppState;
use eyeopener_portal::{build_router, middleware};

/// Anon key the mock project expects.
pub const ANON_KEY: &str = "test-anon-key";

/// Password every test account signs in with.
pub const PASSWORD: &str = "correct-horse";

/// Timestamp used for seeded rows.
pub const CREATED_AT: &str = "2025-01-05T18:30:00Z";

/// An account known to the mock project.
#[derive(Debug, Clone, Copy)]
pub struct TestUser {
    pub id: &'static str,
    pub email: &'static str,
    pub full_name: &'static str,
    pub role: &'static str,
    pub access_token: &'static str,
}

/// The practitioner.
pub const ADMIN: TestUser = TestUser {
    id: "a1d2c3e4-0000-4000-8000-000000000001",
    email: "travis@eyeopener.test",
    full_name: "Travis Perry",
    role: "admin",
    access_token: "admin-access-token",
};

/// A regular client.
pub const CLIENT: TestUser = TestUser {
    id: "c1d2c3e4-0000-4000-8000-000000000002",
    email: "seeker@eyeopener.test",
    full_name: "Sam Seeker",
    role: "user",
    access_token: "client-access-token",
};

impl TestUser {
    /// `public.profiles` row.
    #[must_use]
    pub fn profile(&self) -> Value {
        json!({
            "user_id": self.id,
            "email": self.email,
            "full_name": self.full_name,
            "role": self.role,
            "created_at": CREATED_AT,
        })
    }

    fn session(&self) -> Value {
        json!({
            "access_token": self.access_token,
            "refresh_token": format!("{}-refresh", self.access_token),
            "expires_in": 3600,
            "token_type": "bearer",
            "user": {
                "id": self.id,
                "email": self.email,
                "user_metadata": {"full_name": self.full_name},
            },
        })
    }
}

/// `public.readings` row.
#[must_use]
pub fn reading_row(id: &str, owner: &TestUser, reading_type: &str, title: &str, content: Value) -> Value {
    json!({
        "id": id,
        "user_id": owner.id,
        "reading_type": reading_type,
        "title": title,
        "content": content,
        "created_at": CREATED_AT,
    })
}

/// A response with its body read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Assert a redirect to `to`.
    pub fn assert_redirect(&self, to: &str) {
        assert!(
            self.status.is_redirection(),
            "expected redirect to {to}, got {}",
            self.status
        );
        assert_eq!(self.location.as_deref(), Some(to));
    }
}

/// The portal router wired to a mock Supabase project.
///
/// Carries the session cookie between requests like a browser would.
pub struct TestPortal {
    pub supabase: MockServer,
    router: Router,
    cookie: Option<String>,
}

impl TestPortal {
    /// Start a mock project and build the router against it.
    pub async fn start() -> Self {
        let supabase = MockServer::start().await;

        let config = PortalConfig {
            database_url: SecretString::from("postgres://localhost/eyeopener_test"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            supabase: SupabaseConfig::new(&supabase.uri(), ANON_KEY).unwrap(),
            sentry: SentryConfig::default(),
        };

        // Only the readiness probe touches the pool, so it never connects here.
        let pool = PgPoolOptions::new()
            .connect_lazy(config.database_url.expose_secret())
            .unwrap();
        let session_layer = middleware::create_session_layer(MemoryStore::default(), &config);
        let router = build_router(AppState::new(config, pool), session_layer);

        Self {
            supabase,
            router,
            cookie: None,
        }
    }

    /// Sign in through the form and keep the session cookie.
    pub async fn sign_in_as(&mut self, user: &TestUser) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(body_partial_json(json!({"email": user.email})))
            .respond_with(ResponseTemplate::new(200).set_body_json(user.session()))
            .mount(&self.supabase)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("user_id", format!("eq.{}", user.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([user.profile()])))
            .mount(&self.supabase)
            .await;

        let response = self
            .post_form("/auth/sign-in", &[("email", user.email), ("password", PASSWORD)])
            .await;
        response.assert_redirect("/");
    }

    /// Serve `rows` as the owner's reading list.
    pub async fn mount_readings_for(&self, owner: &TestUser, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/readings"))
            .and(query_param("user_id", format!("eq.{}", owner.id)))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.supabase)
            .await;
    }

    /// Serve the admin console's lists: every reading, every profile, and
    /// the owner lookup.
    pub async fn mount_admin_lists(&self, readings: Value, profiles: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/readings"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param_is_missing("user_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(readings))
            .mount(&self.supabase)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profiles.clone()))
            .mount(&self.supabase)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("select", "user_id,email,full_name,role,created_at"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profiles))
            .mount(&self.supabase)
            .await;
    }

    /// Serve `rows` for a lookup of one reading.
    pub async fn mount_reading(&self, id: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/readings"))
            .and(query_param("id", format!("eq.{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.supabase)
            .await;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}
