//! In-memory implementations of the ports.
//!
//! Behavior-faithful doubles for the external collaborators: a document
//! store with push snapshot fan-out, an identity provider with a seedable
//! account table, and a file storage backend. They drive the unit and
//! integration tests and double as reference implementations of the port
//! contracts (failure injection included).

pub mod identity;
pub mod storage;
pub mod store;

pub use identity::MemoryIdentity;
pub use storage::MemoryStorage;
pub use store::MemoryStore;
