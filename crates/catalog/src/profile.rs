//! Student profile loading.

use std::sync::Arc;

use studyhub_core::{PrincipalId, Profile};

use crate::ports::store::{DocumentStore, collections};

/// Fetches the extended profile record for a student principal.
///
/// Admins never have a profile; the session layer does not call this for
/// them. Every failure mode (transport, absent document, malformed
/// document) collapses to `None`: a missing profile is non-fatal and the
/// session still resolves.
#[derive(Clone)]
pub struct ProfileLoader {
    store: Arc<dyn DocumentStore>,
}

impl ProfileLoader {
    /// Create a loader over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch the profile for `principal`, or `None`.
    pub async fn load(&self, principal: &PrincipalId) -> Option<Profile> {
        let document = match self.store.get(collections::USERS, principal.as_str()).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::debug!(principal = %principal, "no profile record");
                return None;
            }
            Err(error) => {
                tracing::error!(principal = %principal, %error, "profile fetch failed");
                return None;
            }
        };

        match serde_json::from_value(document) {
            Ok(profile) => Some(profile),
            Err(error) => {
                tracing::error!(principal = %principal, %error, "malformed profile record");
                None
            }
        }
    }
}
