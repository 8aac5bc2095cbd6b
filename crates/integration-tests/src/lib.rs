//! Integration tests for StudyHub.
//!
//! End-to-end scenarios over the catalog core with the in-memory backends
//! standing in for the external collaborators. No network, no real store:
//! the tests exercise the same composition the application wires up.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p studyhub-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use studyhub_catalog::memory::{MemoryIdentity, MemoryStorage, MemoryStore};
use studyhub_catalog::ports::store::DocumentStore;
use studyhub_catalog::profile::ProfileLoader;
use studyhub_catalog::repository::CourseRepository;
use studyhub_catalog::session::{SessionState, SessionView};
use studyhub_catalog::subscription::{CatalogSnapshot, CatalogSubscription};
use studyhub_catalog::{CatalogConfig, EntitlementLoader, RoleClassifier};
use studyhub_core::Email;
use tokio::sync::watch;

/// The admin address every fixture allow-lists.
pub const ADMIN_EMAIL: &str = "admin@studyhub.tn";

static TRACING: Once = Once::new();

/// Install a test subscriber honoring `RUST_LOG`; safe to call repeatedly.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// The full composition under test, wired the way the application does it.
pub struct TestContext {
    pub config: CatalogConfig,
    pub classifier: RoleClassifier,
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorage>,
    pub identity: Arc<MemoryIdentity>,
    pub session: SessionState,
    pub courses: CourseRepository,
    pub entitlements: EntitlementLoader,
}

impl TestContext {
    /// Build a fresh context with an empty store and no one signed in.
    ///
    /// # Panics
    ///
    /// Panics if the fixture admin email fails to parse.
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let config =
            CatalogConfig::new(vec![Email::parse(ADMIN_EMAIL).expect("fixture admin email")]);
        let classifier = RoleClassifier::from_config(&config);
        let store = Arc::new(MemoryStore::new());
        let store_port = Arc::clone(&store) as Arc<dyn DocumentStore>;
        let storage = Arc::new(MemoryStorage::new());
        let identity = Arc::new(MemoryIdentity::new(
            classifier.clone(),
            Arc::clone(&store_port),
        ));
        let session = SessionState::spawn(
            identity.as_ref(),
            ProfileLoader::new(Arc::clone(&store_port)),
            classifier.clone(),
        );
        let courses = CourseRepository::new(Arc::clone(&store_port));
        let entitlements = EntitlementLoader::new(store_port);
        Self {
            config,
            classifier,
            store,
            storage,
            identity,
            session,
            courses,
            entitlements,
        }
    }

    /// A catalog subscription over the shared store.
    #[must_use]
    pub fn catalog(&self) -> CatalogSubscription {
        CatalogSubscription::new(Arc::clone(&self.store) as Arc<dyn DocumentStore>)
    }

    /// Record an entitlement the way the (out of scope) payment path would.
    pub fn grant_entitlement(&self, user_id: &str, course_id: &str) {
        self.store.seed(
            studyhub_catalog::ports::store::collections::PURCHASES,
            &format!("{user_id}_{course_id}"),
            serde_json::json!({ "userId": user_id, "courseId": course_id }),
        );
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait until the session view satisfies `predicate`.
///
/// # Panics
///
/// Panics if the view does not settle within five seconds.
pub async fn wait_for_session(
    views: &mut watch::Receiver<SessionView>,
    predicate: impl Fn(&SessionView) -> bool,
) -> SessionView {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let view = views.borrow_and_update();
                if predicate(&view) {
                    return view.clone();
                }
            }
            views.changed().await.expect("session driver gone");
        }
    })
    .await
    .expect("session view did not settle")
}

/// Wait until the catalog snapshot satisfies `predicate`.
///
/// # Panics
///
/// Panics if the snapshot does not settle within five seconds.
pub async fn wait_for_catalog(
    snapshots: &mut watch::Receiver<CatalogSnapshot>,
    predicate: impl Fn(&CatalogSnapshot) -> bool,
) -> CatalogSnapshot {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let snapshot = snapshots.borrow_and_update();
                if predicate(&snapshot) {
                    return snapshot.clone();
                }
            }
            snapshots.changed().await.expect("subscription gone");
        }
    })
    .await
    .expect("catalog snapshot did not settle")
}
