//! Authentication middleware and extractors.
//!
//! [`AuthContext`] resolves who is signed in for the current request: it
//! reads the session, refreshes an expiring access token, and looks up the
//! admin flag. Handlers never see a half-resolved context.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::db::Principal;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// The signed-in user with their resolved admin flag.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: CurrentUser,
    pub is_admin: bool,
}

impl SignedIn {
    /// The identity repositories act for.
    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user.id,
            is_admin: self.is_admin,
            access_token: self.user.access_token.clone(),
        }
    }
}

/// Per-request auth state: `None` when signed out.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(auth: AuthContext) -> impl IntoResponse {
///     match auth.signed_in() {
///         Some(s) => format!("Hello, {}!", s.user.email),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuthContext(pub Option<SignedIn>);

impl AuthContext {
    #[must_use]
    pub const fn signed_in(&self) -> Option<&SignedIn> {
        self.0.as_ref()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(|s| s.is_admin)
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<Self>() {
            return Ok(ctx.clone());
        }

        let ctx = match parts.extensions.get::<Session>() {
            Some(session) => resolve(session, state).await,
            None => Self::default(),
        };

        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

/// Read the session user, refreshing tokens and resolving the admin flag.
async fn resolve(session: &Session, state: &AppState) -> AuthContext {
    let stored: Option<CurrentUser> = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten();

    let Some(mut user) = stored else {
        return AuthContext::default();
    };

    let auth = AuthService::new(state);

    if user.needs_refresh(Utc::now()) {
        match auth.refresh(&user).await {
            Ok(fresh) => {
                if let Err(e) = set_current_user(session, &fresh).await {
                    tracing::error!(error = %e, "Failed to store refreshed session");
                }
                user = fresh;
            }
            Err(e) => {
                log_refresh_failure(&e);
                if let Err(e) = clear_current_user(session).await {
                    tracing::error!(error = %e, "Failed to clear expired session");
                }
                clear_sentry_user();
                return AuthContext::default();
            }
        }
    }

    let is_admin = auth.is_admin(&user).await;
    set_sentry_user(&user.id, Some(&user.email));
    AuthContext(Some(SignedIn { user, is_admin }))
}

fn log_refresh_failure(err: &AuthError) {
    match err {
        AuthError::SessionExpired => tracing::info!("Refresh token rejected, signing out"),
        other => tracing::warn!(error = %other, "Token refresh failed, signing out"),
    }
}

/// Error returned when a signed-in (or admin) user is required.
pub enum AuthRejection {
    /// Not signed in: go to the sign-in page.
    RedirectToSignIn,
    /// Signed out or not an admin: back to the landing page.
    RedirectHome,
    /// Unauthorized response (for non-HTML requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn => Redirect::to("/auth").into_response(),
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Extractor that requires a signed-in user.
///
/// Redirects to `/auth` when signed out.
pub struct RequireUser(pub SignedIn);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<Session>().is_none() {
            return Err(AuthRejection::Unauthorized);
        }

        let AuthContext(ctx) = AuthContext::from_request_parts(parts, state)
            .await
            .unwrap_or_default();
        ctx.map(Self).ok_or(AuthRejection::RedirectToSignIn)
    }
}

/// Extractor that requires an admin.
///
/// Anyone else, signed in or not, is redirected to `/`.
pub struct RequireAdmin(pub SignedIn);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<Session>().is_none() {
            return Err(AuthRejection::Unauthorized);
        }

        let AuthContext(ctx) = AuthContext::from_request_parts(parts, state)
            .await
            .unwrap_or_default();
        match ctx {
            Some(signed_in) if signed_in.is_admin => Ok(Self(signed_in)),
            Some(signed_in) => {
                tracing::info!(user_id = %signed_in.user.id, path = %parts.uri.path(), "Non-admin turned away from admin console");
                Err(AuthRejection::RedirectHome)
            }
            None => Err(AuthRejection::RedirectHome),
        }
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (sign out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
