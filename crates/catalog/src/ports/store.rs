//! The remote document store contract.
//!
//! A generic collection/document store with one-shot reads, partial and
//! merge writes, and push-style live subscriptions. The transport and query
//! engine behind it are external; the in-memory implementation in
//! [`crate::memory`] backs the tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::error::StoreError;

/// Collection names used by the catalog core.
pub mod collections {
    /// Course documents, keyed by course id.
    pub const COURSES: &str = "courses";
    /// Student profile documents, keyed by principal id.
    pub const USERS: &str = "users";
    /// Entitlement records, keyed by purchase id.
    pub const PURCHASES: &str = "purchases";
}

/// A conjunction of field-equality clauses.
///
/// This is the whole query language the core needs: the scoped catalog
/// queries are single- or double-clause equality matches. No ordering or
/// range support.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// The unfiltered match-everything filter.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// A single field-equality clause.
    #[must_use]
    pub fn field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            clauses: vec![(name.into(), value.into())],
        }
    }

    /// Add another equality clause (logical AND).
    #[must_use]
    pub fn and(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((name.into(), value.into()));
        self
    }

    /// Whether the given document satisfies every clause.
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(name, expected)| document.get(name) == Some(expected))
    }
}

/// One notification on a live subscription channel.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    /// The full current result set; replaces any previous snapshot.
    Snapshot(Vec<Value>),
    /// The subscription failed. Consumers must fall back to an empty list
    /// rather than keeping a possibly stale one.
    Error(StoreError),
}

/// Receiving half of a live subscription.
///
/// Snapshots arrive in delivery order; the channel is unbounded so the
/// store never blocks on a slow consumer.
pub type SnapshotReceiver = mpsc::UnboundedReceiver<SnapshotEvent>;

/// Release capability for a live subscription.
///
/// Dropping the handle synchronously stops future snapshot delivery; the
/// release closure runs exactly once.
pub struct SubscriptionHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    /// Wrap a release closure.
    #[must_use]
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("released", &self.release.is_none())
            .finish()
    }
}

/// The remote document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document, `None` if absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// One-shot query of every document matching `filter`.
    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Write a full document, creating or replacing it.
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    /// Partial update of the named fields on an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Additive merge: append `element` to an array field unless an equal
    /// element is already present. Must not clobber concurrent additions
    /// from other sessions.
    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: Value,
    ) -> Result<(), StoreError>;

    /// Subtractive merge: remove every element equal to `element` from an
    /// array field.
    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: Value,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Open a live subscription over `filter`.
    ///
    /// The current result set is delivered immediately as the first
    /// snapshot, then redelivered in full whenever the underlying data
    /// changes. Dropping the returned handle stops delivery.
    fn subscribe(&self, collection: &str, filter: Filter)
    -> (SubscriptionHandle, SnapshotReceiver);
}
