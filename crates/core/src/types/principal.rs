//! The authenticated identity handle.

use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::id::PrincipalId;

/// An authenticated identity as reported by the identity provider.
///
/// Held exclusively by the identity layer and replaced wholesale on
/// sign-in/sign-out; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub email: Email,
}

impl Principal {
    /// Best-effort display name: the stored display name, falling back to
    /// the email local part.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.email.local_part())
    }
}
