//! Extended student profile records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::email::Email;

/// Extended attributes for a student principal, stored in the `users`
/// collection and created at sign-up. Read-only afterward; admins have no
/// profile record at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub institution: String,
    /// Academic level, e.g. "L3" or "M1".
    pub level: String,
    /// Account kind label recorded at sign-up.
    #[serde(default = "default_user_kind")]
    pub user_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
}

fn default_user_kind() -> String {
    "Étudiant".to_owned()
}

impl Profile {
    /// Full display name, first name first.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_kind_defaults() {
        let doc = serde_json::json!({
            "firstName": "Amira",
            "lastName": "Ben Salah",
            "email": "amira@example.com",
            "institution": "FST",
            "level": "L3"
        });
        let profile: Profile = serde_json::from_value(doc).unwrap();
        assert_eq!(profile.user_kind, "Étudiant");
        assert_eq!(profile.full_name(), "Amira Ben Salah");
    }
}
