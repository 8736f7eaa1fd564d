//! Eyeopener Core - Shared domain types.
//!
//! This crate provides the types used across all Eyeopener components:
//! - `portal` - Public site, client dashboard and admin console
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Persistence and authentication live in the hosted
//! Supabase backend; the portal talks to it and hands the results to these types.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, emails, roles, reading types and reading content
//! - [`validation`] - Form field rules checked before any network call

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::ValidationError;
