//! Reading models.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use eyeopener_core::{ContentInput, ReadingId, ReadingType, UserId};

/// A row of `public.readings`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reading {
    pub id: ReadingId,
    pub user_id: UserId,
    pub reading_type: ReadingType,
    pub title: String,
    #[serde(default)]
    pub content: Value,
    pub created_at: DateTime<Utc>,
}

/// A reading joined with its owner's profile, for the admin list.
#[derive(Debug, Clone)]
pub struct ReadingWithOwner {
    pub reading: Reading,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

impl ReadingWithOwner {
    /// Owner's name, falling back to their email.
    #[must_use]
    pub fn owner_label(&self) -> &str {
        self.owner_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.owner_email.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Input for creating a reading.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub user_id: UserId,
    pub reading_type: ReadingType,
    pub title: String,
    pub content: ContentInput,
}

/// Partial update of a reading's mutable fields.
#[derive(Debug, Clone, Default)]
pub struct ReadingUpdate {
    pub title: Option<String>,
    pub reading_type: Option<ReadingType>,
    pub content: Option<ContentInput>,
}
