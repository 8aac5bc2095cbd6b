//! Race-free session resolution.
//!
//! [`SessionState`] composes the identity provider's notification stream,
//! the role classifier and the profile loader into one coherent live view:
//! who is signed in, what role they hold, and (for students) their profile.
//!
//! The tricky part is interleaving: profile fetches are asynchronous and a
//! second identity event can arrive before the first fetch completes. Every
//! identity event bumps an epoch counter; a profile fetch captures the
//! epoch at launch and its result is discarded if the epoch moved on by
//! completion time. This replaces ad hoc "is this still current" flags
//! with a single compare-and-discard rule.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use studyhub_core::{Principal, Profile, Role};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ports::identity::{IdentityPort, IdentitySignal};
use crate::profile::ProfileLoader;
use crate::role::RoleClassifier;

/// The live session view handed to presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub principal: Option<Principal>,
    /// Student profile; always `None` for admins and signed-out views.
    pub profile: Option<Profile>,
    pub role: Option<Role>,
    /// True until the identity provider has emitted at least one signal
    /// and any pending profile fetch for the current principal settled.
    pub resolving: bool,
}

impl SessionView {
    /// The view before the identity provider has said anything.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            principal: None,
            profile: None,
            role: None,
            resolving: true,
        }
    }

    /// The settled signed-out view.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            principal: None,
            profile: None,
            role: None,
            resolving: false,
        }
    }

    /// Whether a principal is present and resolution has settled.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.principal.is_some() && !self.resolving
    }
}

/// Live session state.
///
/// Owns a driver task consuming identity signals; dropping the state
/// aborts the driver. The view is published through a watch channel, so
/// consumers always observe the latest frame and intermediate frames may
/// be skipped.
pub struct SessionState {
    views: watch::Receiver<SessionView>,
    driver: JoinHandle<()>,
}

impl SessionState {
    /// Spawn the session driver.
    #[must_use]
    pub fn spawn(
        identity: &dyn IdentityPort,
        profiles: ProfileLoader,
        classifier: RoleClassifier,
    ) -> Self {
        let (tx, views) = watch::channel(SessionView::initial());
        let signals = identity.sessions();
        let driver = tokio::spawn(drive(signals, profiles, classifier, Arc::new(tx)));
        Self { views, driver }
    }

    /// Subscribe to the live view.
    #[must_use]
    pub fn views(&self) -> watch::Receiver<SessionView> {
        self.views.clone()
    }

    /// The latest frame.
    #[must_use]
    pub fn current(&self) -> SessionView {
        self.views.borrow().clone()
    }
}

impl Drop for SessionState {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(
    mut signals: watch::Receiver<IdentitySignal>,
    profiles: ProfileLoader,
    classifier: RoleClassifier,
    tx: Arc<watch::Sender<SessionView>>,
) {
    let epoch = Arc::new(AtomicU64::new(0));
    loop {
        let signal = signals.borrow_and_update().clone();
        apply_signal(signal, &profiles, &classifier, &tx, &epoch);
        if signals.changed().await.is_err() {
            break;
        }
    }
}

fn apply_signal(
    signal: IdentitySignal,
    profiles: &ProfileLoader,
    classifier: &RoleClassifier,
    tx: &Arc<watch::Sender<SessionView>>,
    epoch: &Arc<AtomicU64>,
) {
    // Every signal supersedes whatever fetch is still in flight.
    let token = epoch.fetch_add(1, Ordering::SeqCst) + 1;

    match signal {
        // Keep the initial resolving view until the provider says something.
        IdentitySignal::Undetermined => {}
        IdentitySignal::SignedOut => {
            tracing::debug!("session signed out");
            tx.send_replace(SessionView::signed_out());
        }
        IdentitySignal::SignedIn(principal) => match classifier.classify(&principal.email) {
            Role::Admin => {
                // Admins carry no profile; the view resolves immediately.
                tracing::debug!(principal = %principal.id, "admin session resolved");
                tx.send_replace(SessionView {
                    principal: Some(principal),
                    profile: None,
                    role: Some(Role::Admin),
                    resolving: false,
                });
            }
            Role::Student => {
                if !tx.borrow().resolving {
                    tx.send_replace(SessionView {
                        principal: Some(principal.clone()),
                        profile: None,
                        role: Some(Role::Student),
                        resolving: true,
                    });
                }
                spawn_profile_fetch(principal, profiles.clone(), Arc::clone(tx), Arc::clone(epoch), token);
            }
        },
    }
}

fn spawn_profile_fetch(
    principal: Principal,
    profiles: ProfileLoader,
    tx: Arc<watch::Sender<SessionView>>,
    epoch: Arc<AtomicU64>,
    token: u64,
) {
    tokio::spawn(async move {
        let profile = profiles.load(&principal.id).await;
        // Discard the result if another identity event arrived meanwhile.
        if epoch.load(Ordering::SeqCst) != token {
            tracing::debug!(principal = %principal.id, "discarding stale profile result");
            return;
        }
        tracing::debug!(principal = %principal.id, has_profile = profile.is_some(), "student session resolved");
        tx.send_replace(SessionView {
            principal: Some(principal),
            profile,
            role: Some(Role::Student),
            resolving: false,
        });
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use studyhub_core::{Email, PrincipalId};

    use super::*;
    use crate::memory::identity::MemoryIdentity;
    use crate::memory::store::MemoryStore;
    use crate::ports::store::{DocumentStore, collections};

    fn principal(id: &str, email: &str) -> Principal {
        Principal {
            id: PrincipalId::new(id),
            display_name: None,
            email: Email::parse(email).unwrap(),
        }
    }

    fn profile_doc(name: &str, email: &str) -> serde_json::Value {
        json!({
            "firstName": name,
            "lastName": "Test",
            "email": email,
            "institution": "FST",
            "level": "L3"
        })
    }

    struct Fixture {
        identity: Arc<MemoryIdentity>,
        store: Arc<MemoryStore>,
        session: SessionState,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let classifier = RoleClassifier::new(vec![Email::parse("admin@studyhub.tn").unwrap()]);
        let identity = Arc::new(MemoryIdentity::new(
            classifier.clone(),
            Arc::clone(&store) as Arc<dyn DocumentStore>,
        ));
        let session = SessionState::spawn(
            identity.as_ref(),
            ProfileLoader::new(Arc::clone(&store) as Arc<dyn DocumentStore>),
            classifier,
        );
        Fixture {
            identity,
            store,
            session,
        }
    }

    async fn wait_for(
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
                views.changed().await.unwrap();
            }
        })
        .await
        .expect("view did not settle")
    }

    #[tokio::test]
    async fn test_resolving_until_first_signal() {
        let fixture = fixture();
        assert!(fixture.session.current().resolving);

        fixture.identity.resolve_signed_out();
        let mut views = fixture.session.views();
        let view = wait_for(&mut views, |v| !v.resolving).await;
        assert_eq!(view, SessionView::signed_out());
    }

    #[tokio::test]
    async fn test_admin_resolves_immediately_without_profile() {
        let fixture = fixture();
        // A profile record for the admin id must never be fetched.
        fixture.store.seed(
            collections::USERS,
            "admin-1",
            profile_doc("Should", "admin@studyhub.tn"),
        );

        fixture
            .identity
            .emit(IdentitySignal::SignedIn(principal("admin-1", "admin@studyhub.tn")));
        let mut views = fixture.session.views();
        let view = wait_for(&mut views, |v| !v.resolving).await;
        assert_eq!(view.role, Some(Role::Admin));
        assert!(view.profile.is_none());
        assert!(view.is_signed_in());
    }

    #[tokio::test]
    async fn test_student_resolves_with_profile() {
        let fixture = fixture();
        fixture.store.seed(
            collections::USERS,
            "u-1",
            profile_doc("Amira", "amira@example.com"),
        );

        fixture
            .identity
            .emit(IdentitySignal::SignedIn(principal("u-1", "amira@example.com")));
        let mut views = fixture.session.views();
        let view = wait_for(&mut views, |v| !v.resolving).await;
        assert_eq!(view.role, Some(Role::Student));
        assert_eq!(view.profile.unwrap().first_name, "Amira");
    }

    #[tokio::test]
    async fn test_profile_failure_is_non_fatal() {
        let fixture = fixture();
        fixture.store.set_offline(true);

        fixture
            .identity
            .emit(IdentitySignal::SignedIn(principal("u-1", "amira@example.com")));
        let mut views = fixture.session.views();
        let view = wait_for(&mut views, |v| !v.resolving).await;
        assert_eq!(view.role, Some(Role::Student));
        assert!(view.profile.is_none());
        assert!(view.principal.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_profile_result_is_discarded() {
        let fixture = fixture();
        fixture.store.seed(
            collections::USERS,
            "u-a",
            profile_doc("Stale", "a@example.com"),
        );
        fixture.store.seed(
            collections::USERS,
            "u-b",
            profile_doc("Fresh", "b@example.com"),
        );
        // Principal A's fetch completes long after B's.
        fixture
            .store
            .set_read_delay(collections::USERS, "u-a", Duration::from_secs(10));

        fixture
            .identity
            .emit(IdentitySignal::SignedIn(principal("u-a", "a@example.com")));
        // Let the driver launch A's (slow) fetch before switching accounts.
        tokio::time::sleep(Duration::from_millis(1)).await;

        fixture
            .identity
            .emit(IdentitySignal::SignedIn(principal("u-b", "b@example.com")));
        let mut views = fixture.session.views();
        let view = wait_for(&mut views, |v| !v.resolving && v.profile.is_some()).await;
        assert_eq!(view.profile.as_ref().unwrap().first_name, "Fresh");

        // Let A's delayed fetch complete; B's view must remain unchanged.
        tokio::time::sleep(Duration::from_secs(20)).await;
        let after = fixture.session.current();
        assert_eq!(after.principal.unwrap().id.as_str(), "u-b");
        assert_eq!(after.profile.unwrap().first_name, "Fresh");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_discards_in_flight_fetch() {
        let fixture = fixture();
        fixture.store.seed(
            collections::USERS,
            "u-a",
            profile_doc("Stale", "a@example.com"),
        );
        fixture
            .store
            .set_read_delay(collections::USERS, "u-a", Duration::from_secs(10));

        fixture
            .identity
            .emit(IdentitySignal::SignedIn(principal("u-a", "a@example.com")));
        // Let the driver launch the (slow) fetch before signing out.
        tokio::time::sleep(Duration::from_millis(1)).await;
        let mut views = fixture.session.views();

        fixture.identity.resolve_signed_out();
        let view = wait_for(&mut views, |v| !v.resolving && v.principal.is_none()).await;
        assert_eq!(view, SessionView::signed_out());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(fixture.session.current(), SessionView::signed_out());
    }

    #[tokio::test]
    async fn test_no_signed_out_flicker_while_sign_in_pending() {
        let fixture = fixture();
        fixture.store.seed(
            collections::USERS,
            "u-1",
            profile_doc("Amira", "amira@example.com"),
        );

        let mut views = fixture.session.views();
        fixture
            .identity
            .emit(IdentitySignal::SignedIn(principal("u-1", "amira@example.com")));

        // Every frame observed before settlement either resolves the
        // signed-in principal or is still resolving; none reports a
        // settled signed-out state.
        let view = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let view = views.borrow_and_update();
                    assert!(
                        view.resolving || view.principal.is_some(),
                        "settled signed-out frame during pending sign-in"
                    );
                    if !view.resolving {
                        return view.clone();
                    }
                }
                views.changed().await.unwrap();
            }
        })
        .await
        .expect("view did not settle");
        assert!(view.is_signed_in());
    }
}
