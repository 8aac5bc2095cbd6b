//! In-memory identity provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use studyhub_core::{Email, Outcome, Principal, PrincipalId, Profile};
use tokio::sync::watch;

use crate::ports::identity::{IdentityPort, IdentitySignal, LoginOutcome, SignupRequest};
use crate::ports::store::{DocumentStore, collections};
use crate::role::RoleClassifier;

struct Account {
    password: String,
    principal: Principal,
}

/// In-memory [`IdentityPort`] with a seedable account table.
///
/// Sign-up writes the student profile record to the injected store, the
/// way the real provider pairs account creation with a profile document.
/// Tests can push raw session signals with [`emit`](Self::emit).
pub struct MemoryIdentity {
    signals: watch::Sender<IdentitySignal>,
    accounts: Mutex<HashMap<Email, Account>>,
    classifier: RoleClassifier,
    store: Arc<dyn DocumentStore>,
    next_account: AtomicU64,
}

impl MemoryIdentity {
    /// Create a provider with no accounts and an undetermined session.
    #[must_use]
    pub fn new(classifier: RoleClassifier, store: Arc<dyn DocumentStore>) -> Self {
        let (signals, _) = watch::channel(IdentitySignal::default());
        Self {
            signals,
            accounts: Mutex::new(HashMap::new()),
            classifier,
            store,
            next_account: AtomicU64::new(1),
        }
    }

    /// Seed an account without going through sign-up.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed_account(&self, principal: Principal, password: &str) {
        self.accounts.lock().expect("accounts lock").insert(
            principal.email.clone(),
            Account {
                password: password.to_owned(),
                principal,
            },
        );
    }

    /// Push a raw session signal, as the provider would on its own.
    pub fn emit(&self, signal: IdentitySignal) {
        self.signals.send_replace(signal);
    }

    /// Report the initial "no one is signed in" determination.
    pub fn resolve_signed_out(&self) {
        self.emit(IdentitySignal::SignedOut);
    }
}

#[async_trait]
impl IdentityPort for MemoryIdentity {
    fn sessions(&self) -> watch::Receiver<IdentitySignal> {
        self.signals.subscribe()
    }

    async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let Ok(email) = Email::parse(email) else {
            return LoginOutcome::failure("Invalid email or password");
        };

        let principal = {
            let accounts = self.accounts.lock().expect("accounts lock");
            match accounts.get(&email) {
                Some(account) if account.password == password => account.principal.clone(),
                _ => return LoginOutcome::failure("Invalid email or password"),
            }
        };

        let is_admin = self.classifier.is_admin(&principal.email);
        self.emit(IdentitySignal::SignedIn(principal));
        LoginOutcome::ok(is_admin)
    }

    async fn signup_with_profile(&self, request: SignupRequest) -> Outcome {
        let required = [
            &request.first_name,
            &request.last_name,
            &request.email,
            &request.password,
            &request.institution,
            &request.level,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Outcome::failure("Please fill in all required fields");
        }

        let email = match Email::parse(&request.email) {
            Ok(email) => email,
            Err(error) => return Outcome::failure(error.to_string()),
        };

        let principal = {
            let mut accounts = self.accounts.lock().expect("accounts lock");
            if accounts.contains_key(&email) {
                return Outcome::failure("An account with this email already exists");
            }
            let id = self.next_account.fetch_add(1, Ordering::SeqCst);
            let principal = Principal {
                id: PrincipalId::new(format!("user-{id}")),
                display_name: Some(format!("{} {}", request.first_name, request.last_name)),
                email: email.clone(),
            };
            accounts.insert(
                email.clone(),
                Account {
                    password: request.password.clone(),
                    principal: principal.clone(),
                },
            );
            principal
        };

        let profile = Profile {
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            institution: request.institution,
            level: request.level,
            user_kind: "Étudiant".to_owned(),
            registered_at: Some(Utc::now()),
        };
        let document = match serde_json::to_value(&profile) {
            Ok(document) => document,
            Err(error) => return Outcome::failure(error.to_string()),
        };
        if let Err(error) = self
            .store
            .put(collections::USERS, principal.id.as_str(), document)
            .await
        {
            tracing::error!(%error, "profile write failed during sign-up");
            return Outcome::failure("Unable to create the account");
        }

        self.emit(IdentitySignal::SignedIn(principal));
        Outcome::ok("Account created")
    }

    async fn logout(&self) {
        self.emit(IdentitySignal::SignedOut);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::store::MemoryStore;

    fn identity() -> (MemoryIdentity, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let classifier = RoleClassifier::new(vec![Email::parse("admin@studyhub.tn").unwrap()]);
        (
            MemoryIdentity::new(classifier, Arc::clone(&store) as Arc<dyn DocumentStore>),
            store,
        )
    }

    #[tokio::test]
    async fn test_signup_creates_profile_and_signs_in() {
        let (identity, store) = identity();
        let outcome = identity
            .signup_with_profile(SignupRequest {
                first_name: "Amira".to_owned(),
                last_name: "Ben Salah".to_owned(),
                email: "amira@example.com".to_owned(),
                password: "secret123".to_owned(),
                institution: "FST".to_owned(),
                level: "L3".to_owned(),
            })
            .await;
        assert!(outcome.success, "{}", outcome.message);

        let signal = identity.sessions().borrow().clone();
        let IdentitySignal::SignedIn(principal) = signal else {
            panic!("expected signed-in signal");
        };
        let profile = store
            .get(collections::USERS, principal.id.as_str())
            .await
            .unwrap();
        assert!(profile.is_some());
    }

    #[tokio::test]
    async fn test_signup_requires_all_fields() {
        let (identity, _store) = identity();
        let outcome = identity
            .signup_with_profile(SignupRequest {
                first_name: String::new(),
                last_name: "Ben Salah".to_owned(),
                email: "amira@example.com".to_owned(),
                password: "secret123".to_owned(),
                institution: "FST".to_owned(),
                level: "L3".to_owned(),
            })
            .await;
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_login_reports_admin_flag() {
        let (identity, _store) = identity();
        identity.seed_account(
            Principal {
                id: PrincipalId::new("admin-1"),
                display_name: None,
                email: Email::parse("admin@studyhub.tn").unwrap(),
            },
            "hunter2",
        );

        let outcome = identity.login("admin@studyhub.tn", "hunter2").await;
        assert!(outcome.success);
        assert_eq!(outcome.is_admin, Some(true));

        let failed = identity.login("admin@studyhub.tn", "wrong").await;
        assert!(!failed.success);
        assert!(failed.is_admin.is_none());
    }

    #[tokio::test]
    async fn test_logout_signals_signed_out() {
        let (identity, _store) = identity();
        identity.emit(IdentitySignal::SignedIn(Principal {
            id: PrincipalId::new("u-1"),
            display_name: None,
            email: Email::parse("someone@example.com").unwrap(),
        }));
        identity.logout().await;
        assert_eq!(
            identity.sessions().borrow().clone(),
            IdentitySignal::SignedOut
        );
    }
}
