//! Core types for Eyeopener.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod content;
pub mod email;
pub mod id;
pub mod reading;
pub mod role;

pub use content::{ContentError, ContentInput, ContentPreview, PreviewEntry};
pub use email::{Email, EmailError};
pub use id::*;
pub use reading::{ReadingType, ReadingTypeError};
pub use role::Role;
