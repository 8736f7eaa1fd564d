//! Domain models for the portal.

pub mod profile;
pub mod reading;
pub mod session;

pub use profile::Profile;
pub use reading::{NewReading, Reading, ReadingUpdate, ReadingWithOwner};
pub use session::{CurrentUser, keys as session_keys};
