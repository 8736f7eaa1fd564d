//! Authentication service.
//!
//! Wraps GoTrue sign-in, sign-up, refresh and sign-out, and resolves the
//! admin flag from the user's profile. Session storage is left to the caller.

mod error;

pub use error::AuthError;

use chrono::Utc;
use tracing::instrument;

use eyeopener_core::{Email, UserId, validation};

use crate::db::ProfileRepository;
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::supabase::{SignUpOutcome, SupabaseError};

/// Result of a successful sign-up.
#[derive(Debug)]
pub enum SignUpResult {
    /// The project auto-confirms: the user is signed in.
    SignedIn(CurrentUser),
    /// A confirmation email was sent; no session yet.
    ConfirmationPending { email: String },
}

/// Authentication service.
pub struct AuthService<'a> {
    state: &'a AppState,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` before any network call for a malformed
    /// email or short password, `AuthError::InvalidCredentials` for wrong
    /// credentials, or `AuthError::Provider` if GoTrue is unreachable.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email).map_err(validation::ValidationError::from)?;
        validation::validate_password(password)?;

        let session = self
            .state
            .supabase()
            .sign_in_with_password(email.as_str(), password)
            .await
            .map_err(map_sign_in_error)?;

        let user = CurrentUser::from_auth_session(&session, Utc::now());
        self.state.admin_flags().invalidate(&user.id).await;
        tracing::info!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` before any network call for a malformed
    /// email, short password or short name, `AuthError::UserAlreadyExists` if
    /// the email is taken, or `AuthError::Provider` if GoTrue is unreachable.
    #[instrument(skip(self, password, full_name))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpResult, AuthError> {
        let email = Email::parse(email).map_err(validation::ValidationError::from)?;
        validation::validate_password(password)?;
        let full_name = validation::validate_full_name(full_name)?;

        let outcome = self
            .state
            .supabase()
            .sign_up(email.as_str(), password, &full_name)
            .await
            .map_err(map_sign_up_error)?;

        Ok(match outcome {
            SignUpOutcome::SignedIn(session) => {
                let user = CurrentUser::from_auth_session(&session, Utc::now());
                self.state.admin_flags().invalidate(&user.id).await;
                tracing::info!(user_id = %user.id, "User signed up");
                SignUpResult::SignedIn(user)
            }
            SignUpOutcome::ConfirmationPending(user) => {
                tracing::info!(user_id = %user.id, "User signed up, confirmation pending");
                SignUpResult::ConfirmationPending {
                    email: user.email.unwrap_or_else(|| email.into_inner()),
                }
            }
        })
    }

    /// Exchange the stored refresh token for fresh tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` if GoTrue rejects the refresh token.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn refresh(&self, user: &CurrentUser) -> Result<CurrentUser, AuthError> {
        let session = self
            .state
            .supabase()
            .refresh_session(&user.refresh_token)
            .await
            .map_err(|e| match e.status() {
                Some(s) if s.is_client_error() => AuthError::SessionExpired,
                _ => AuthError::Provider(e),
            })?;
        Ok(CurrentUser::from_auth_session(&session, Utc::now()))
    }

    /// Revoke the provider session.
    ///
    /// Failures are logged; the local session is cleared regardless.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn sign_out(&self, user: &CurrentUser) {
        self.state.admin_flags().invalidate(&user.id).await;
        if let Err(e) = self.state.supabase().sign_out(&user.access_token).await {
            tracing::warn!(error = %e, "Provider sign-out failed");
        }
        tracing::info!("User signed out");
    }

    /// Whether the user's profile grants the admin console.
    ///
    /// Cached per user. A failed lookup counts as a regular client and is not
    /// cached.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn is_admin(&self, user: &CurrentUser) -> bool {
        let lookup = self
            .state
            .admin_flags()
            .try_get_with(user.id, self.fetch_admin_flag(user.id, &user.access_token))
            .await;

        match lookup {
            Ok(is_admin) => is_admin,
            Err(e) => {
                tracing::warn!(error = %e, "Profile lookup failed, treating as regular client");
                false
            }
        }
    }

    async fn fetch_admin_flag(
        &self,
        user_id: UserId,
        access_token: &str,
    ) -> Result<bool, crate::db::RepositoryError> {
        let profile = ProfileRepository::new(self.state.supabase(), access_token)
            .get(user_id)
            .await?;
        Ok(profile.is_some_and(|p| p.is_admin()))
    }
}

fn map_sign_in_error(err: SupabaseError) -> AuthError {
    match &err {
        SupabaseError::Api { status, message } if status.is_client_error() => {
            if message.to_lowercase().contains("invalid login credentials") {
                AuthError::InvalidCredentials
            } else {
                AuthError::Rejected(message.clone())
            }
        }
        _ => AuthError::Provider(err),
    }
}

fn map_sign_up_error(err: SupabaseError) -> AuthError {
    match &err {
        SupabaseError::Api { status, message } if status.is_client_error() => {
            if message.to_lowercase().contains("already registered") {
                AuthError::UserAlreadyExists
            } else {
                AuthError::Rejected(message.clone())
            }
        }
        _ => AuthError::Provider(err),
    }
}
