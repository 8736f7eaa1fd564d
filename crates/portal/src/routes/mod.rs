//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Landing page
//!
//! # Auth
//! GET  /auth                           - Sign in / sign up tabs (?tab=signup)
//! POST /auth/sign-in                   - Sign in
//! POST /auth/sign-up                   - Sign up
//! POST /auth/sign-out                  - Sign out, back to /
//!
//! # Client portal (requires sign-in)
//! GET  /dashboard                      - Own readings
//!
//! # Admin console (requires admin)
//! GET  /admin                          - Readings, users, stats, create dialog
//! POST /admin/readings                 - Create reading
//! GET  /admin/readings/{id}/edit       - Admin page with the edit dialog open
//! POST /admin/readings/{id}            - Save edited reading
//! POST /admin/readings/{id}/delete     - Delete reading
//! ```
//!
//! `/health`, `/health/ready` and `/static` are mounted by the binary.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use eyeopener_core::{ContentPreview, PreviewEntry};

use crate::middleware::AuthContext;
use crate::models::{Reading, ReadingWithOwner};
use crate::state::AppState;

// =============================================================================
// Shared view types
// =============================================================================

/// Query parameters carrying a one-shot notice code.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// A notice banner ("toast").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }

    /// Resolve a notice from query codes. Unknown codes are ignored so the
    /// query string can never inject text into the page.
    #[must_use]
    pub fn from_query(query: &MessageQuery) -> Option<Self> {
        query
            .error
            .as_deref()
            .and_then(error_message)
            .map(Self::error)
            .or_else(|| {
                query
                    .success
                    .as_deref()
                    .and_then(success_message)
                    .map(Self::success)
            })
    }
}

fn success_message(code: &str) -> Option<&'static str> {
    match code {
        "created" => Some("Reading created successfully"),
        "updated" => Some("Reading updated successfully"),
        "deleted" => Some("Reading deleted successfully"),
        _ => None,
    }
}

fn error_message(code: &str) -> Option<&'static str> {
    match code {
        "create_failed" => Some("Failed to create reading"),
        "update_failed" => Some("Failed to update reading"),
        "delete_failed" => Some("Failed to delete reading"),
        "load_failed" => Some("Failed to load readings"),
        "missing" => Some("Reading not found"),
        "session" => Some("Your session has expired, please sign in again"),
        _ => None,
    }
}

/// What the navigation auth button shows.
#[derive(Debug, Clone, Default)]
pub struct NavView {
    /// Signed-in email, `None` when signed out.
    pub email: Option<String>,
    pub is_admin: bool,
}

impl From<&AuthContext> for NavView {
    fn from(ctx: &AuthContext) -> Self {
        Self {
            email: ctx.signed_in().map(|s| s.user.email.clone()),
            is_admin: ctx.is_admin(),
        }
    }
}

/// A reading as rendered on a dashboard or admin card.
#[derive(Debug, Clone)]
pub struct ReadingCard {
    pub id: String,
    pub title: String,
    pub badge_text: String,
    pub badge_class: &'static str,
    /// Owner's name or email (admin cards only).
    pub owner: Option<String>,
    /// Long date, e.g. `January 5, 2025`.
    pub date: String,
    /// Object content: up to three `label: value` lines.
    pub preview_entries: Vec<PreviewEntry>,
    /// Any other content: one shortened line.
    pub preview_text: Option<String>,
    /// Show edit and delete controls.
    pub manageable: bool,
}

impl ReadingCard {
    /// Card for the owner's dashboard.
    #[must_use]
    pub fn for_owner(reading: &Reading) -> Self {
        let (preview_entries, preview_text) = match ContentPreview::of(&reading.content) {
            ContentPreview::Entries(entries) => (entries, None),
            ContentPreview::Text(text) => (Vec::new(), Some(text)),
        };

        Self {
            id: reading.id.to_string(),
            title: reading.title.clone(),
            badge_text: reading.reading_type.badge_text(),
            badge_class: reading.reading_type.badge_class(),
            owner: None,
            date: long_date(reading),
            preview_entries,
            preview_text,
            manageable: false,
        }
    }

    /// Card for the admin console, with owner and controls.
    #[must_use]
    pub fn for_admin(row: &ReadingWithOwner) -> Self {
        Self {
            owner: Some(row.owner_label().to_string()),
            manageable: true,
            ..Self::for_owner(&row.reading)
        }
    }
}

fn long_date(reading: &Reading) -> String {
    reading.created_at.format("%B %-d, %Y").to_string()
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::auth_page))
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-out", post(auth::sign_out))
}

/// Create the admin console router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/readings", post(admin::create_reading))
        .route("/readings/{id}", post(admin::update_reading))
        .route("/readings/{id}/edit", get(admin::edit_reading))
        .route("/readings/{id}/delete", post(admin::delete_reading))
}

/// Create all page routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/dashboard", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use eyeopener_core::ReadingType;
    use serde_json::json;

    fn reading(content: serde_json::Value) -> Reading {
        Reading {
            id: "2d9c4b3a-1e7f-4a6b-8c5d-9e0f1a2b3c4d".parse().unwrap(),
            user_id: "6f1c1f8e-2f47-4c52-9a3b-4f2d2b8e9c10".parse().unwrap(),
            reading_type: ReadingType::BoneReading,
            title: "Ancestral guidance".to_string(),
            content,
            created_at: chrono::Utc.with_ymd_and_hms(2025, 1, 5, 18, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_notice_from_query() {
        let query = MessageQuery {
            error: None,
            success: Some("created".to_string()),
        };
        assert_eq!(
            Notice::from_query(&query),
            Some(Notice::success("Reading created successfully"))
        );

        let query = MessageQuery {
            error: Some("delete_failed".to_string()),
            success: Some("created".to_string()),
        };
        assert_eq!(
            Notice::from_query(&query),
            Some(Notice::error("Failed to delete reading"))
        );
    }

    #[test]
    fn test_notice_ignores_unknown_codes() {
        let query = MessageQuery {
            error: Some("<script>".to_string()),
            success: None,
        };
        assert_eq!(Notice::from_query(&query), None);
    }

    #[test]
    fn test_owner_card() {
        let card = ReadingCard::for_owner(&reading(json!({"ancestor_message": "Be patient"})));
        assert_eq!(card.date, "January 5, 2025");
        assert_eq!(card.badge_text, "bone reading");
        assert_eq!(card.badge_class, "bg-red-500/20 text-red-300");
        assert_eq!(card.preview_entries.len(), 1);
        assert_eq!(card.preview_entries[0].label, "ancestor message");
        assert!(card.preview_text.is_none());
        assert!(!card.manageable);
    }

    #[test]
    fn test_admin_card_shows_owner() {
        let row = ReadingWithOwner {
            reading: reading(json!("plain text")),
            owner_name: None,
            owner_email: Some("seeker@example.com".to_string()),
        };
        let card = ReadingCard::for_admin(&row);
        assert_eq!(card.owner.as_deref(), Some("seeker@example.com"));
        assert!(card.manageable);
        assert!(card.preview_entries.is_empty());
        assert!(card.preview_text.is_some());
    }
}
