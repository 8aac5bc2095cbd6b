//! Ports to the external collaborators.
//!
//! The identity provider, remote document store and file storage are out of
//! scope; this module defines the narrow async contracts the core consumes
//! them through. Implementations are injected as `Arc<dyn …>` - there are
//! no process-wide singletons.

pub mod identity;
pub mod storage;
pub mod store;

pub use identity::{IdentityPort, IdentitySignal, LoginOutcome, SignupRequest};
pub use storage::{FileStorage, StoredFile};
pub use store::{
    DocumentStore, Filter, SnapshotEvent, SnapshotReceiver, SubscriptionHandle, collections,
};
