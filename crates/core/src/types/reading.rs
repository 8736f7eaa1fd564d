//! Reading types offered by the practice.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known reading type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid reading type: {0}")]
pub struct ReadingTypeError(pub String);

/// The kind of consultation a reading records.
///
/// Stored as the Postgres enum `reading_type` with snake_case labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "reading_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ReadingType {
    Tarot,
    Astrology,
    Numerology,
    Palmistry,
    BoneReading,
    Cleansing,
}

impl ReadingType {
    /// Every type, in the order the admin form lists them.
    pub const ALL: [Self; 6] = [
        Self::Tarot,
        Self::Astrology,
        Self::Numerology,
        Self::Palmistry,
        Self::BoneReading,
        Self::Cleansing,
    ];

    /// Wire and database name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tarot => "tarot",
            Self::Astrology => "astrology",
            Self::Numerology => "numerology",
            Self::Palmistry => "palmistry",
            Self::BoneReading => "bone_reading",
            Self::Cleansing => "cleansing",
        }
    }

    /// Human label for select options.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tarot => "Tarot",
            Self::Astrology => "Astrology",
            Self::Numerology => "Numerology",
            Self::Palmistry => "Palmistry",
            Self::BoneReading => "Bone Reading",
            Self::Cleansing => "Cleansing",
        }
    }

    /// Badge text: the wire name with its first underscore replaced by a space.
    #[must_use]
    pub fn badge_text(self) -> String {
        self.as_str().replacen('_', " ", 1)
    }

    /// CSS classes for the type badge.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Tarot => "bg-purple-500/20 text-purple-300",
            Self::Astrology => "bg-blue-500/20 text-blue-300",
            Self::Numerology => "bg-green-500/20 text-green-300",
            Self::Palmistry => "bg-yellow-500/20 text-yellow-300",
            Self::BoneReading => "bg-red-500/20 text-red-300",
            Self::Cleansing => "bg-indigo-500/20 text-indigo-300",
        }
    }
}

impl fmt::Display for ReadingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReadingType {
    type Err = ReadingTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ReadingTypeError(s.to_owned()))
    }
}
