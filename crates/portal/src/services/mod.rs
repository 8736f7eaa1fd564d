//! Business logic services.

pub mod auth;

pub use auth::{AuthError, AuthService, SignUpResult};
