//! Authentication route handlers.
//!
//! Sign-in and sign-up post back to `/auth`. Field errors are rendered inline
//! next to the offending input; provider failures become a notice banner.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use eyeopener_core::{Email, ValidationError, validation};

use crate::error::{self, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{AuthContext, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::routes::{NavView, Notice};
use crate::services::{AuthError, AuthService, SignUpResult};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the auth page.
#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    /// `signup` opens the sign-up tab.
    pub tab: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Which tab is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTab {
    SignIn,
    SignUp,
}

/// Sign-in tab values and errors.
#[derive(Debug, Default)]
pub struct SignInDraft {
    pub email: String,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
}

/// Sign-up tab values and errors.
#[derive(Debug, Default)]
pub struct SignUpDraft {
    pub full_name: String,
    pub email: String,
    pub full_name_error: Option<String>,
    pub email_error: Option<String>,
    pub password_error: Option<String>,
}

impl SignInDraft {
    /// Check every field, keeping the typed email for re-display.
    fn check(form: &SignInForm) -> Self {
        Self {
            email: form.email.clone(),
            email_error: field_error(Email::parse(&form.email).map_err(ValidationError::from)),
            password_error: field_error(validation::validate_password(&form.password)),
        }
    }

    const fn has_errors(&self) -> bool {
        self.email_error.is_some() || self.password_error.is_some()
    }
}

impl SignUpDraft {
    fn check(form: &SignUpForm) -> Self {
        Self {
            full_name: form.full_name.clone(),
            email: form.email.clone(),
            full_name_error: field_error(validation::validate_full_name(&form.full_name)),
            email_error: field_error(Email::parse(&form.email).map_err(ValidationError::from)),
            password_error: field_error(validation::validate_password(&form.password)),
        }
    }

    const fn has_errors(&self) -> bool {
        self.full_name_error.is_some() || self.email_error.is_some() || self.password_error.is_some()
    }
}

fn field_error<T>(result: Result<T, ValidationError>) -> Option<String> {
    result.err().map(|e| e.to_string())
}

/// Sign in / sign up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub tab: AuthTab,
    pub sign_in: SignInDraft,
    pub sign_up: SignUpDraft,
}

impl AuthTemplate {
    fn new(tab: AuthTab) -> Self {
        Self {
            nav: NavView::default(),
            notice: None,
            tab,
            sign_in: SignInDraft::default(),
            sign_up: SignUpDraft::default(),
        }
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    /// Whether the sign-up tab is the open one.
    #[must_use]
    pub fn sign_up_open(&self) -> bool {
        self.tab == AuthTab::SignUp
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the sign in / sign up page.
///
/// Already signed-in users are sent to the landing page.
pub async fn auth_page(auth: AuthContext, Query(query): Query<AuthQuery>) -> Response {
    if auth.signed_in().is_some() {
        return Redirect::to("/").into_response();
    }

    let tab = match query.tab.as_deref() {
        Some("signup") => AuthTab::SignUp,
        _ => AuthTab::SignIn,
    };
    AuthTemplate::new(tab).into_response()
}

/// Handle sign-in form submission.
#[instrument(skip(state, session, form))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignInForm>,
) -> Response {
    let draft = SignInDraft::check(&form);
    if draft.has_errors() {
        return AuthTemplate {
            sign_in: draft,
            ..AuthTemplate::new(AuthTab::SignIn)
        }
        .into_response();
    }

    match AuthService::new(&state)
        .sign_in(&form.email, &form.password)
        .await
    {
        Ok(user) => start_session(&session, &user).await,
        Err(e) => {
            log_auth_failure("Sign-in", &e);
            AuthTemplate {
                sign_in: SignInDraft {
                    email: form.email,
                    ..SignInDraft::default()
                },
                ..AuthTemplate::new(AuthTab::SignIn)
            }
            .with_notice(Notice::error(e.user_message()))
            .into_response()
        }
    }
}

/// Handle sign-up form submission.
#[instrument(skip(state, session, form))]
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Response {
    let draft = SignUpDraft::check(&form);
    if draft.has_errors() {
        return AuthTemplate {
            sign_up: draft,
            ..AuthTemplate::new(AuthTab::SignUp)
        }
        .into_response();
    }

    match AuthService::new(&state)
        .sign_up(&form.email, &form.password, &form.full_name)
        .await
    {
        Ok(SignUpResult::SignedIn(user)) => start_session(&session, &user).await,
        Ok(SignUpResult::ConfirmationPending { email }) => {
            add_breadcrumb("auth", "Sign-up awaiting confirmation", None);
            AuthTemplate {
                sign_in: SignInDraft {
                    email,
                    ..SignInDraft::default()
                },
                ..AuthTemplate::new(AuthTab::SignIn)
            }
            .with_notice(Notice::success("Check your email to confirm your account"))
            .into_response()
        }
        Err(e) => {
            log_auth_failure("Sign-up", &e);
            AuthTemplate {
                sign_up: SignUpDraft {
                    full_name: form.full_name,
                    email: form.email,
                    ..SignUpDraft::default()
                },
                ..AuthTemplate::new(AuthTab::SignUp)
            }
            .with_notice(Notice::error(e.user_message()))
            .into_response()
        }
    }
}

/// Handle sign-out.
///
/// The provider session is revoked best-effort. The local session must be
/// cleared before the user lands on `/`.
#[instrument(skip(state, session))]
pub async fn sign_out(
    State(state): State<AppState>,
    session: Session,
) -> error::Result<Redirect> {
    let stored: Option<CurrentUser> = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten();

    if let Some(user) = stored {
        AuthService::new(&state).sign_out(&user).await;
    }

    clear_current_user(&session).await?;
    session.cycle_id().await?;
    clear_sentry_user();

    Ok(Redirect::to("/"))
}

/// Store the user in a fresh session and go to the landing page.
async fn start_session(session: &Session, user: &CurrentUser) -> Response {
    // New id on privilege change
    if let Err(e) = session.cycle_id().await {
        tracing::error!(error = %e, "Failed to rotate session id");
    }

    if let Err(e) = set_current_user(session, user).await {
        tracing::error!(error = %e, "Failed to store session");
        return AuthTemplate::new(AuthTab::SignIn)
            .with_notice(Notice::error("Could not start your session, please try again"))
            .into_response();
    }

    set_sentry_user(&user.id, Some(&user.email));
    add_breadcrumb("auth", "Signed in", None);
    Redirect::to("/").into_response()
}

fn log_auth_failure(action: &str, err: &AuthError) {
    match err {
        AuthError::Provider(e) => tracing::error!(error = %e, "{action} failed"),
        other => tracing::info!(error = %other, "{action} refused"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_draft_collects_field_errors() {
        let draft = SignInDraft::check(&SignInForm {
            email: "not-an-email".to_string(),
            password: "123".to_string(),
        });
        assert!(draft.has_errors());
        assert_eq!(
            draft.email_error.as_deref(),
            Some("Please enter a valid email address")
        );
        assert_eq!(
            draft.password_error.as_deref(),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(draft.email, "not-an-email");
    }

    #[test]
    fn test_sign_up_draft_requires_full_name() {
        let draft = SignUpDraft::check(&SignUpForm {
            full_name: "T".to_string(),
            email: "seeker@example.com".to_string(),
            password: "moonlight".to_string(),
        });
        assert!(draft.has_errors());
        assert!(draft.full_name_error.is_some());
        assert!(draft.email_error.is_none());
        assert!(draft.password_error.is_none());
    }

    #[test]
    fn test_valid_sign_up_draft() {
        let draft = SignUpDraft::check(&SignUpForm {
            full_name: "Seeker".to_string(),
            email: "seeker@example.com".to_string(),
            password: "moonlight".to_string(),
        });
        assert!(!draft.has_errors());
    }

    #[test]
    fn test_auth_page_renders_inline_errors() {
        let html = AuthTemplate {
            sign_up: SignUpDraft {
                full_name_error: Some("Full name must be at least 2 characters".to_string()),
                ..SignUpDraft::default()
            },
            ..AuthTemplate::new(AuthTab::SignUp)
        }
        .render()
        .unwrap();
        assert!(html.contains("Full name must be at least 2 characters"));
        assert!(html.contains("Create Account"));
    }
}
