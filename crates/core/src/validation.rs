//! Form field rules shared by the auth and admin forms.
//!
//! These checks run before any request leaves the portal.

use crate::types::{ContentError, EmailError, ReadingTypeError};

/// Minimum password length accepted at sign-in and sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum full name length accepted at sign-up.
pub const MIN_FULL_NAME_LEN: usize = 2;

/// A single field that failed validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    Email(#[from] EmailError),

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    #[error("Full name must be at least {MIN_FULL_NAME_LEN} characters")]
    FullNameTooShort,

    #[error("Please select a client")]
    MissingOwner,

    #[error("Please select a reading type")]
    ReadingType(#[from] ReadingTypeError),

    #[error("Title is required")]
    MissingTitle,

    #[error("Content must be valid JSON")]
    Content(#[from] ContentError),
}

/// Check password length.
///
/// # Errors
///
/// Returns [`ValidationError::PasswordTooShort`].
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Check and trim a full name.
///
/// # Errors
///
/// Returns [`ValidationError::FullNameTooShort`].
pub fn validate_full_name(full_name: &str) -> Result<String, ValidationError> {
    let full_name = full_name.trim();
    if full_name.chars().count() < MIN_FULL_NAME_LEN {
        return Err(ValidationError::FullNameTooShort);
    }
    Ok(full_name.to_owned())
}

/// Check and trim a reading title.
///
/// # Errors
///
/// Returns [`ValidationError::MissingTitle`].
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    Ok(title.to_owned())
}
