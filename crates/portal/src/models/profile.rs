//! Profile model.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use eyeopener_core::{Role, UserId};

/// A row of `public.profiles`: the application-level user record.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Full name, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or("Unknown")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_and_display() {
        let profile: Profile = serde_json::from_value(json!({
            "user_id": "6f1c1f8e-2f47-4c52-9a3b-4f2d2b8e9c10",
            "email": "seeker@example.com",
            "full_name": null,
            "role": "user",
            "created_at": "2025-01-05T10:00:00+00:00"
        }))
        .unwrap();
        assert!(!profile.is_admin());
        assert_eq!(profile.display_name(), "seeker@example.com");
    }

    #[test]
    fn test_missing_role_is_user() {
        let profile: Profile = serde_json::from_value(json!({
            "user_id": "6f1c1f8e-2f47-4c52-9a3b-4f2d2b8e9c10",
            "full_name": "Travis",
            "created_at": "2025-01-05T10:00:00Z"
        }))
        .unwrap();
        assert!(!profile.is_admin());
        assert_eq!(profile.display_name(), "Travis");
    }
}
