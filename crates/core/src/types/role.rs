//! Profile roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Role stored in `profiles.role`.
///
/// The column is free text: `"admin"` grants the admin console, every other
/// value (including the default `"user"`) is a regular client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Practitioner with access to every reading and user.
    Admin,
    /// Client who sees only their own readings.
    #[default]
    User,
}

impl Role {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        if s.trim() == "admin" {
            Self::Admin
        } else {
            Self::User
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admin_is_admin() {
        assert!(Role::from("admin").is_admin());
        assert!(!Role::from("user").is_admin());
        assert!(!Role::from("Admin").is_admin());
        assert!(!Role::from("").is_admin());
    }

    #[test]
    fn test_serde_accepts_any_text() {
        let role: Role = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(role, Role::User);
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
