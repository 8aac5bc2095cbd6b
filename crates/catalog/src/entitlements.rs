//! Entitlement loading.

use std::collections::HashSet;
use std::sync::Arc;

use studyhub_core::{CourseId, Entitlement, PrincipalId};

use crate::ports::store::{DocumentStore, Filter, collections};

/// One-shot fetch of the course ids the current principal has acquired.
///
/// Entitlements are not subscribed live: a point-in-time read at view
/// construction is enough because records are additive only and the write
/// path (payment) is outside this codebase.
#[derive(Clone)]
pub struct EntitlementLoader {
    store: Arc<dyn DocumentStore>,
}

impl EntitlementLoader {
    /// Create a loader over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The set of course ids `principal` owns.
    ///
    /// With no principal the set is empty and no remote call is made.
    /// Fetch failures and malformed records are logged and yield an empty
    /// or partial set; callers never see an error.
    pub async fn owned_course_ids(&self, principal: Option<&PrincipalId>) -> HashSet<CourseId> {
        let Some(principal) = principal else {
            return HashSet::new();
        };

        let filter = Filter::field("userId", principal.as_str());
        let documents = match self.store.query(collections::PURCHASES, &filter).await {
            Ok(documents) => documents,
            Err(error) => {
                tracing::error!(principal = %principal, %error, "entitlement fetch failed");
                return HashSet::new();
            }
        };

        documents
            .into_iter()
            .filter_map(|document| match serde_json::from_value::<Entitlement>(document) {
                Ok(entitlement) => Some(entitlement.course_id),
                Err(error) => {
                    tracing::error!(principal = %principal, %error, "malformed entitlement record");
                    None
                }
            })
            .collect()
    }
}
