//! The identity provider contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use studyhub_core::{Outcome, Principal};
use tokio::sync::watch;

/// One identity-provider notification.
///
/// `Undetermined` is the state before the provider has emitted anything;
/// the session layer keeps `resolving: true` until the first real signal so
/// a pending sign-in is never presented as "signed out".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdentitySignal {
    /// The provider has not yet determined the session state.
    #[default]
    Undetermined,
    /// No one is signed in.
    SignedOut,
    /// The given principal is signed in.
    SignedIn(Principal),
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub success: bool,
    /// Whether the signed-in principal is an admin; absent on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    pub message: String,
}

impl LoginOutcome {
    /// A successful login.
    #[must_use]
    pub fn ok(is_admin: bool) -> Self {
        Self {
            success: true,
            is_admin: Some(is_admin),
            message: "Signed in".to_owned(),
        }
    }

    /// A failed login.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            is_admin: None,
            message: message.into(),
        }
    }
}

/// Fields collected by the sign-up form.
///
/// All fields are required; the identity provider creates the account and
/// writes the student profile record in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub institution: String,
    /// Academic level, e.g. "L3".
    pub level: String,
}

/// The external identity provider.
#[async_trait]
pub trait IdentityPort: Send + Sync {
    /// Session-change notification stream.
    ///
    /// The receiver always holds the latest signal; consumers observe
    /// changes, not an event history.
    fn sessions(&self) -> watch::Receiver<IdentitySignal>;

    /// Attempt to sign in with an email address and secret.
    async fn login(&self, email: &str, password: &str) -> LoginOutcome;

    /// Create an account together with its student profile record.
    async fn signup_with_profile(&self, request: SignupRequest) -> Outcome;

    /// Sign the current principal out.
    async fn logout(&self);
}
