//! Live, role-scoped catalog synchronization.
//!
//! [`CatalogSubscription`] keeps an in-memory course list synchronized with
//! the store through a push subscription. Each snapshot wholesale-replaces
//! the list; there is no incremental patching. Re-scoping releases the
//! previous subscription before opening the new one - overlapping
//! subscriptions would interleave snapshots from two queries - and a
//! stale forwarder is additionally fenced off by an epoch check.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use studyhub_core::{Course, CourseStatus, PrincipalId, Role};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ports::store::{
    DocumentStore, Filter, SnapshotEvent, SubscriptionHandle, collections,
};

/// Which slice of the catalog a subscription covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogScope {
    /// Courses authored by the given principal, all statuses. The admin
    /// view.
    AuthoredBy(PrincipalId),
    /// Published courses from any author. The student view.
    Published,
    /// Published courses in one category.
    PublishedInCategory(String),
}

impl CatalogScope {
    /// The scope a role gets by default.
    #[must_use]
    pub fn for_role(role: Role, principal: &PrincipalId) -> Self {
        match role {
            Role::Admin => Self::AuthoredBy(principal.clone()),
            Role::Student => Self::Published,
        }
    }

    fn filter(&self) -> Filter {
        let published = serde_json::to_value(CourseStatus::Published).unwrap_or_default();
        match self {
            Self::AuthoredBy(principal) => Filter::field("createdBy", principal.as_str()),
            Self::Published => Filter::field("status", published),
            Self::PublishedInCategory(category) => {
                Filter::field("status", published).and("category", category.as_str())
            }
        }
    }
}

/// The synchronized course list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub courses: Vec<Course>,
    /// True from (re)subscribe until the first snapshot or error arrives.
    pub loading: bool,
}

impl Default for CatalogSnapshot {
    fn default() -> Self {
        Self {
            courses: Vec::new(),
            loading: true,
        }
    }
}

struct Active {
    // Held for its Drop: releasing stops snapshot delivery.
    _handle: SubscriptionHandle,
    forwarder: JoinHandle<()>,
}

/// A live subscription over one [`CatalogScope`] at a time.
pub struct CatalogSubscription {
    store: Arc<dyn DocumentStore>,
    tx: Arc<watch::Sender<CatalogSnapshot>>,
    rx: watch::Receiver<CatalogSnapshot>,
    epoch: Arc<AtomicU64>,
    active: Mutex<Option<Active>>,
}

impl CatalogSubscription {
    /// Create an idle subscription; nothing is delivered until the first
    /// [`resubscribe`](Self::resubscribe).
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (tx, rx) = watch::channel(CatalogSnapshot::default());
        Self {
            store,
            tx: Arc::new(tx),
            rx,
            epoch: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
        }
    }

    /// Subscribe to the synchronized list.
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<CatalogSnapshot> {
        self.rx.clone()
    }

    /// The latest snapshot.
    #[must_use]
    pub fn current(&self) -> CatalogSnapshot {
        self.rx.borrow().clone()
    }

    /// Swap the live subscription to a new scope.
    ///
    /// The previous subscription is released before the new one opens, so
    /// no snapshot from the old scope can be observed after this call.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn resubscribe(&self, scope: &CatalogScope) {
        let token = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.teardown();

        self.tx.send_modify(|snapshot| snapshot.loading = true);

        let (handle, mut events) = self.store.subscribe(collections::COURSES, scope.filter());
        tracing::debug!(?scope, "catalog subscription opened");

        let tx = Arc::clone(&self.tx);
        let epoch = Arc::clone(&self.epoch);
        let forwarder = tokio::spawn(async move {
            // One forwarder applies snapshots sequentially, in delivery
            // order; a superseded forwarder stops at the epoch fence.
            while let Some(event) = events.recv().await {
                if epoch.load(Ordering::SeqCst) != token {
                    break;
                }
                match event {
                    SnapshotEvent::Snapshot(documents) => {
                        let courses = decode_courses(documents);
                        tx.send_replace(CatalogSnapshot {
                            courses,
                            loading: false,
                        });
                    }
                    SnapshotEvent::Error(error) => {
                        tracing::error!(%error, "catalog subscription error");
                        tx.send_replace(CatalogSnapshot {
                            courses: Vec::new(),
                            loading: false,
                        });
                    }
                }
            }
        });

        *self.active.lock().expect("subscription lock") = Some(Active {
            _handle: handle,
            forwarder,
        });
    }

    /// Release the live subscription without opening a new one.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn release(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.teardown();
        self.tx.send_modify(|snapshot| snapshot.loading = false);
    }

    fn teardown(&self) {
        if let Some(active) = self.active.lock().expect("subscription lock").take() {
            active.forwarder.abort();
            // Dropping the handle synchronously stops delivery.
        }
    }
}

impl Drop for CatalogSubscription {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn decode_courses(documents: Vec<serde_json::Value>) -> Vec<Course> {
    documents
        .into_iter()
        .filter_map(|document| match serde_json::from_value::<Course>(document) {
            Ok(course) => Some(course),
            Err(error) => {
                tracing::error!(%error, "dropping malformed course document");
                None
            }
        })
        .collect()
}
