//! In-memory document store with live subscriptions.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::error::StoreError;
use crate::ports::store::{DocumentStore, Filter, SnapshotEvent, SnapshotReceiver, SubscriptionHandle};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, Value>>,
    subscribers: HashMap<u64, Subscriber>,
    next_subscriber: u64,
    offline: bool,
    read_delays: HashMap<(String, String), Duration>,
}

struct Subscriber {
    collection: String,
    filter: Filter,
    tx: mpsc::UnboundedSender<SnapshotEvent>,
}

impl Inner {
    fn matching(&self, collection: &str, filter: &Filter) -> Vec<Value> {
        self.collections
            .get(collection)
            .map(|documents| {
                documents
                    .values()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Redeliver the full matching result set to every subscriber on the
    /// touched collection.
    fn notify(&self, collection: &str) {
        for subscriber in self.subscribers.values() {
            if subscriber.collection == collection {
                let snapshot = self.matching(collection, &subscriber.filter);
                let _ = subscriber.tx.send(SnapshotEvent::Snapshot(snapshot));
            }
        }
    }
}

/// In-memory [`DocumentStore`] with snapshot fan-out.
///
/// Documents live in per-collection ordered maps so query results are
/// deterministic. Failure injection: [`set_offline`](Self::set_offline)
/// makes every call fail, [`emit_error`](Self::emit_error) pushes a
/// subscription error event, and per-document read delays let tests force
/// completion orderings.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without going through the async write path.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed(&self, collection: &str, id: &str, document: Value) {
        let mut inner = self.inner.lock().expect("store lock");
        inner
            .collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), document);
        inner.notify(collection);
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().expect("store lock").offline = offline;
    }

    /// Delay reads of one document, to force async completion orderings.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_read_delay(&self, collection: &str, id: &str, delay: Duration) {
        self.inner
            .lock()
            .expect("store lock")
            .read_delays
            .insert((collection.to_owned(), id.to_owned()), delay);
    }

    /// Push a subscription error to every subscriber of `collection`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn emit_error(&self, collection: &str) {
        let inner = self.inner.lock().expect("store lock");
        for subscriber in inner.subscribers.values() {
            if subscriber.collection == collection {
                let _ = subscriber.tx.send(SnapshotEvent::Error(StoreError::Unavailable(
                    "injected".to_owned(),
                )));
            }
        }
    }

    /// Number of live subscribers, across all collections.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().expect("store lock").subscribers.len()
    }

    fn check_online(inner: &Inner) -> Result<(), StoreError> {
        if inner.offline {
            return Err(StoreError::Unavailable("store offline".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let (document, delay) = {
            let inner = self.inner.lock().expect("store lock");
            Self::check_online(&inner)?;
            let document = inner
                .collections
                .get(collection)
                .and_then(|documents| documents.get(id))
                .cloned();
            let delay = inner
                .read_delays
                .get(&(collection.to_owned(), id.to_owned()))
                .copied();
            (document, delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(document)
    }

    async fn query(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let inner = self.inner.lock().expect("store lock");
        Self::check_online(&inner)?;
        Ok(inner.matching(collection, filter))
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        Self::check_online(&inner)?;
        inner
            .collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), document);
        inner.notify(collection);
        Ok(())
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        Self::check_online(&inner)?;
        let document = inner
            .collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            })?;
        if let Some(object) = document.as_object_mut() {
            for (name, value) in fields {
                object.insert(name, value);
            }
        }
        inner.notify(collection);
        Ok(())
    }

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: Value,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        Self::check_online(&inner)?;
        let document = inner
            .collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            })?;
        if let Some(object) = document.as_object_mut() {
            let array = object
                .entry(field.to_owned())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(elements) = array.as_array_mut()
                && !elements.contains(&element)
            {
                elements.push(element);
            }
        }
        inner.notify(collection);
        Ok(())
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: Value,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        Self::check_online(&inner)?;
        let document = inner
            .collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            })?;
        if let Some(elements) = document
            .as_object_mut()
            .and_then(|object| object.get_mut(field))
            .and_then(Value::as_array_mut)
        {
            elements.retain(|existing| existing != &element);
        }
        inner.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        Self::check_online(&inner)?;
        if let Some(documents) = inner.collections.get_mut(collection) {
            documents.remove(id);
        }
        inner.notify(collection);
        Ok(())
    }

    fn subscribe(
        &self,
        collection: &str,
        filter: Filter,
    ) -> (SubscriptionHandle, SnapshotReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().expect("store lock");

        // The current result set is the first snapshot.
        if inner.offline {
            let _ = tx.send(SnapshotEvent::Error(StoreError::Unavailable(
                "store offline".to_owned(),
            )));
        } else {
            let _ = tx.send(SnapshotEvent::Snapshot(inner.matching(collection, &filter)));
        }

        let id = inner.next_subscriber;
        inner.next_subscriber += 1;
        inner.subscribers.insert(
            id,
            Subscriber {
                collection: collection.to_owned(),
                filter,
                tx,
            },
        );

        let registry = Arc::clone(&self.inner);
        let handle = SubscriptionHandle::new(move || {
            registry.lock().expect("store lock").subscribers.remove(&id);
        });
        (handle, rx)
    }
}
