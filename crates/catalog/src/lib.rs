//! StudyHub Catalog - Session and catalog synchronization core.
//!
//! This crate keeps a role-scoped view of the course catalog continuously
//! synchronized with a remote document store and resolves who the current
//! actor is:
//!
//! - [`session::SessionState`] - who is signed in, what role they hold, and
//!   their student profile, as a race-free live view
//! - [`subscription::CatalogSubscription`] - a live, role-scoped course
//!   list with wholesale snapshot replacement
//! - [`entitlements::EntitlementLoader`] - the set of courses the current
//!   principal has acquired
//! - [`view::CatalogView`] - pure client-side filtering, search and
//!   per-course access decisions
//! - [`repository::CourseRepository`] - course CRUD returning uniform
//!   [`studyhub_core::Outcome`] values
//!
//! External collaborators (identity provider, document store, file storage)
//! are consumed through the traits in [`ports`]; in-memory implementations
//! in [`memory`] back the tests.
//!
//! # Concurrency
//!
//! All apparent concurrency is interleaved async tasks. Live state is owned
//! by exactly one writer and replaced wholesale through `tokio::sync::watch`
//! channels; superseded subscriptions and fetches are suppressed with
//! epoch counters rather than cancelled.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod entitlements;
pub mod error;
pub mod memory;
pub mod ports;
pub mod profile;
pub mod repository;
pub mod role;
pub mod session;
pub mod subscription;
pub mod upload_gate;
pub mod view;

pub use config::CatalogConfig;
pub use entitlements::EntitlementLoader;
pub use error::{ConfigError, StorageError, StoreError, ValidationError};
pub use profile::ProfileLoader;
pub use repository::{CourseRepository, CourseUpdate};
pub use role::RoleClassifier;
pub use session::{SessionState, SessionView};
pub use subscription::{CatalogScope, CatalogSnapshot, CatalogSubscription};
pub use upload_gate::{FilePayload, ResourceDraft};
pub use view::{AccessAction, CatalogView, CourseEntry, NoFilterPolicy, TypeFilters};
