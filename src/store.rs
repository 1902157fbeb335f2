//! Typed in-memory state store.
//!
//! [`StateStore`] holds everything the client has fetched so far, split
//! into a closed set of namespaces (see [`StoreKey`]):
//!
//! - the root API index,
//! - path → translation documents,
//! - one collection document per collection key,
//! - per-type maps of resource key → resource document.
//!
//! Every write replaces its namespace value wholesale — values behave as
//! immutable snapshots, never mutated in place. Subscribers registered via
//! [`StateStore::subscribe`] are notified with the written [`StoreKey`]
//! after each write. Reads and writes are synchronous; nothing is evicted
//! for the lifetime of the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::ApiIndex;
use crate::fetch::translate_path::TranslatedPath;

/// Closed enumeration of cache namespaces.
///
/// Collection and resource namespaces are scoped per object type, so
/// `node--recipe` and `node--page` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The root resource-type-to-URL index.
    ApiIndex,
    /// Path → translation documents.
    PathTranslations,
    /// A collection document, keyed by collection key (`type` or
    /// `type-<params>`).
    Collection(String),
    /// Per-type map of resource key → single-resource document.
    Resources(String),
}

/// A cached JSON:API document, optionally with a pre-computed
/// field-projection payload alongside the raw document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedDocument {
    /// The raw JSON:API document as fetched.
    pub document: Value,
    /// Projected object graph, present when the entry was filled through
    /// the query bridge.
    pub projected: Option<Value>,
}

impl CachedDocument {
    /// A plain document with no projection attached.
    pub fn plain(document: Value) -> Self {
        Self {
            document,
            projected: None,
        }
    }

    /// A document carrying a field-projection payload.
    pub fn with_projection(document: Value, projected: Value) -> Self {
        Self {
            document,
            projected: Some(projected),
        }
    }
}

/// Handle returned by [`StateStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&StoreKey) + Send + Sync>;

#[derive(Default)]
struct Namespaces {
    api_index: Option<ApiIndex>,
    path_translations: HashMap<String, TranslatedPath>,
    collections: HashMap<String, CachedDocument>,
    resources: HashMap<String, HashMap<String, CachedDocument>>,
}

/// Explicit owned state object — no ambient singleton.
///
/// The client owns one of these; callers can reach it via
/// [`Muninn::store()`](crate::Muninn::store) to subscribe or inspect.
#[derive(Default)]
pub struct StateStore {
    inner: RwLock<Namespaces>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached API index, if one has been fetched.
    pub fn api_index(&self) -> Option<ApiIndex> {
        self.read().api_index.clone()
    }

    /// Replace the API index wholesale.
    pub fn set_api_index(&self, index: ApiIndex) {
        self.write().api_index = Some(index);
        self.notify(&StoreKey::ApiIndex);
    }

    /// Snapshot of the path-translation namespace.
    pub fn path_translations(&self) -> HashMap<String, TranslatedPath> {
        self.read().path_translations.clone()
    }

    /// Look up a single cached path translation.
    pub fn path_translation(&self, path: &str) -> Option<TranslatedPath> {
        self.read().path_translations.get(path).cloned()
    }

    /// Replace the path-translation namespace wholesale.
    pub fn set_path_translations(&self, translations: HashMap<String, TranslatedPath>) {
        self.write().path_translations = translations;
        self.notify(&StoreKey::PathTranslations);
    }

    /// Look up a cached collection document.
    pub fn collection(&self, key: &str) -> Option<CachedDocument> {
        self.read().collections.get(key).cloned()
    }

    /// Replace a collection entry wholesale.
    pub fn set_collection(&self, key: &str, doc: CachedDocument) {
        self.write().collections.insert(key.to_string(), doc);
        self.notify(&StoreKey::Collection(key.to_string()));
    }

    /// Delete a collection entry.
    pub fn remove_collection(&self, key: &str) {
        self.write().collections.remove(key);
        self.notify(&StoreKey::Collection(key.to_string()));
    }

    /// Snapshot of the resource map for an object type.
    pub fn resources(&self, object_name: &str) -> Option<HashMap<String, CachedDocument>> {
        self.read().resources.get(object_name).cloned()
    }

    /// Look up a single cached resource by its resource key.
    pub fn resource(&self, object_name: &str, resource_key: &str) -> Option<CachedDocument> {
        self.read()
            .resources
            .get(object_name)
            .and_then(|map| map.get(resource_key))
            .cloned()
    }

    /// Replace an object type's resource map wholesale.
    pub fn set_resources(&self, object_name: &str, resources: HashMap<String, CachedDocument>) {
        self.write()
            .resources
            .insert(object_name.to_string(), resources);
        self.notify(&StoreKey::Resources(object_name.to_string()));
    }

    /// Whether any namespace holds data for the given object type.
    pub fn has_object_data(&self, object_name: &str) -> bool {
        let inner = self.read();
        inner.resources.contains_key(object_name)
            || inner
                .collections
                .keys()
                .any(|k| k == object_name || k.starts_with(&format!("{object_name}-")))
    }

    /// Drop everything, including the API index.
    pub fn clear(&self) {
        *self.write() = Namespaces::default();
    }

    /// Register a listener called with the written [`StoreKey`] after
    /// every set/remove.
    pub fn subscribe(&self, listener: impl Fn(&StoreKey) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .push((id, Box::new(listener)));
        SubscriptionId(id)
    }

    /// Remove a previously registered listener.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .retain(|(lid, _)| *lid != id.0);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Namespaces> {
        self.inner.read().expect("store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Namespaces> {
        self.inner.write().expect("store lock poisoned")
    }

    fn notify(&self, key: &StoreKey) {
        let listeners = self.listeners.lock().expect("listener lock poisoned");
        for (_, listener) in listeners.iter() {
            listener(key);
        }
    }
}
