//! Client dashboard: the signed-in user's own readings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::ReadingRepository;
use crate::filters;
use crate::middleware::{AuthContext, RequireUser};
use crate::routes::{MessageQuery, NavView, Notice, ReadingCard};
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    /// Full name from sign-up, falling back to the email.
    pub greeting_name: String,
    pub readings: Vec<ReadingCard>,
}

/// Display the signed-in user's readings, newest first.
///
/// A failed fetch is logged and shown as a notice over the empty state.
#[instrument(skip_all, fields(user_id = %signed_in.user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(signed_in): RequireUser,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let principal = signed_in.principal();
    let mut notice = Notice::from_query(&query);

    let readings = match ReadingRepository::new(state.supabase(), &principal)
        .list_for_user(signed_in.user.id)
        .await
    {
        Ok(readings) => readings.iter().map(ReadingCard::for_owner).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch readings");
            notice = Some(Notice::error("Failed to load readings"));
            Vec::new()
        }
    };

    let greeting_name = signed_in
        .user
        .full_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| signed_in.user.email.clone());

    let nav = NavView::from(&AuthContext(Some(signed_in)));
    DashboardTemplate {
        nav,
        notice,
        greeting_name,
        readings,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dashboard_shows_empty_state() {
        let html = DashboardTemplate {
            nav: NavView {
                email: Some("seeker@example.com".to_string()),
                is_admin: false,
            },
            notice: None,
            greeting_name: "Seeker".to_string(),
            readings: Vec::new(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Welcome back, Seeker"));
        assert!(html.contains("No readings yet. Start your spiritual journey!"));
        assert!(!html.contains("Admin Panel"));
    }
}
