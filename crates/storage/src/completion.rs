use std::collections::HashSet;

use foundation::ids::MarkerId;
use tracing::warn;

use crate::{COMPLETED_MARKERS_KEY, KeyValueStore, SharedStore, StorageError};

/// Persisted set of marker ids the user flagged as done.
///
/// The set is the source of truth for completion; markers only cache the
/// flag for the current render cycle. Every mutation rewrites the whole
/// persisted array. Write failures are logged and the in-memory set stays
/// authoritative for the rest of the session.
///
/// Ordering contract: ids persist in insertion order.
pub struct CompletionStore {
    store: SharedStore,
    key: String,
    ids: Vec<MarkerId>,
    index: HashSet<MarkerId>,
    last_write_error: Option<StorageError>,
}

impl std::fmt::Debug for CompletionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionStore")
            .field("key", &self.key)
            .field("ids", &self.ids)
            .finish()
    }
}

impl CompletionStore {
    pub fn open(store: SharedStore) -> Self {
        Self::open_with_key(store, COMPLETED_MARKERS_KEY)
    }

    /// Loads the persisted set. A missing key is initialized to `[]`; a
    /// corrupt value is logged and treated as empty.
    pub fn open_with_key(store: SharedStore, key: impl Into<String>) -> Self {
        let key = key.into();
        let raw = store.borrow().get_item(&key);
        let mut out = Self {
            store,
            key,
            ids: Vec::new(),
            index: HashSet::new(),
            last_write_error: None,
        };

        match raw {
            Ok(Some(raw)) => match decode_ids(&raw) {
                Ok(ids) => {
                    for id in ids {
                        out.insert_in_memory(id);
                    }
                }
                Err(e) => warn!(key = %out.key, error = %e, "ignoring corrupt completion set"),
            },
            Ok(None) => out.persist(),
            Err(e) => warn!(key = %out.key, error = %e, "completion set unreadable"),
        }
        out
    }

    pub fn has(&self, id: &MarkerId) -> bool {
        self.index.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[MarkerId] {
        &self.ids
    }

    /// Inserts `id` if absent and persists. Returns `true` if the set changed.
    pub fn add(&mut self, id: &MarkerId) -> bool {
        if !self.insert_in_memory(id.clone()) {
            return false;
        }
        self.persist();
        true
    }

    /// Deletes `id` if present and persists. Returns `true` if the set changed.
    pub fn remove(&mut self, id: &MarkerId) -> bool {
        if !self.index.remove(id) {
            return false;
        }
        self.ids.retain(|x| x != id);
        self.persist();
        true
    }

    /// Error from the most recent write, cleared by the next successful one.
    pub fn last_write_error(&self) -> Option<&StorageError> {
        self.last_write_error.as_ref()
    }

    fn insert_in_memory(&mut self, id: MarkerId) -> bool {
        if !self.index.insert(id.clone()) {
            return false;
        }
        self.ids.push(id);
        true
    }

    fn persist(&mut self) {
        let raw = match serde_json::to_string(&self.ids) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to encode completion set");
                self.last_write_error = Some(StorageError::Io(e.to_string()));
                return;
            }
        };
        match self.store.borrow_mut().set_item(&self.key, &raw) {
            Ok(()) => self.last_write_error = None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to persist completion set");
                self.last_write_error = Some(e);
            }
        }
    }
}

fn decode_ids(raw: &str) -> Result<Vec<MarkerId>, StorageError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw_ids = serde_json::from_str::<Vec<String>>(raw)
        .map_err(|e| StorageError::Corrupt(e.to_string()))?;
    Ok(raw_ids.into_iter().filter_map(MarkerId::new).collect())
}

#[cfg(test)]
mod tests {
    use super::CompletionStore;
    use crate::{COMPLETED_MARKERS_KEY, InMemoryStore, KeyValueStore, StorageError, shared};
    use foundation::ids::MarkerId;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> MarkerId {
        MarkerId::new(s).unwrap()
    }

    fn persisted(store: &crate::SharedStore) -> Option<String> {
        store.borrow().get_item(COMPLETED_MARKERS_KEY).unwrap()
    }

    #[test]
    fn opening_initializes_empty_array() {
        let store = shared(InMemoryStore::new());
        let c = CompletionStore::open(store.clone());
        assert!(c.is_empty());
        assert_eq!(persisted(&store).as_deref(), Some("[]"));
    }

    #[test]
    fn add_is_idempotent() {
        let store = shared(InMemoryStore::new());
        let mut c = CompletionStore::open(store.clone());
        assert!(c.add(&id("m1")));
        let once = persisted(&store);
        assert!(!c.add(&id("m1")));
        assert_eq!(persisted(&store), once);
        assert_eq!(c.len(), 1);
        assert!(c.has(&id("m1")));
    }

    #[test]
    fn remove_is_idempotent() {
        let store = shared(InMemoryStore::new());
        let mut c = CompletionStore::open(store.clone());
        c.add(&id("a"));
        c.add(&id("b"));
        assert!(c.remove(&id("a")));
        assert!(!c.remove(&id("a")));
        assert!(!c.remove(&id("never")));
        assert_eq!(persisted(&store).as_deref(), Some(r#"["b"]"#));
    }

    #[test]
    fn persists_in_insertion_order_and_reloads() {
        let store = shared(InMemoryStore::new());
        {
            let mut c = CompletionStore::open(store.clone());
            c.add(&id("z"));
            c.add(&id("a"));
            c.add(&id("m"));
        }
        assert_eq!(persisted(&store).as_deref(), Some(r#"["z","a","m"]"#));
        let reopened = CompletionStore::open(store);
        assert_eq!(reopened.ids(), &[id("z"), id("a"), id("m")]);
    }

    #[test]
    fn corrupt_value_starts_empty() {
        let store = shared(InMemoryStore::new());
        store
            .borrow_mut()
            .set_item(COMPLETED_MARKERS_KEY, "{not json")
            .unwrap();
        let c = CompletionStore::open(store.clone());
        assert!(c.is_empty());
        // The corrupt value is left alone until the next mutation rewrites it.
        assert_eq!(persisted(&store).as_deref(), Some("{not json"));
    }

    #[test]
    fn duplicate_and_blank_persisted_ids_are_dropped() {
        let store = shared(InMemoryStore::new());
        store
            .borrow_mut()
            .set_item(COMPLETED_MARKERS_KEY, r#"["a","","a","b"]"#)
            .unwrap();
        let c = CompletionStore::open(store);
        assert_eq!(c.ids(), &[id("a"), id("b")]);
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        // Room for the initial "[]" only.
        let quota = COMPLETED_MARKERS_KEY.len() + 2;
        let store = shared(InMemoryStore::with_quota(quota));
        let mut c = CompletionStore::open(store.clone());
        assert!(c.add(&id("m1")));
        assert!(c.has(&id("m1")));
        assert!(matches!(
            c.last_write_error(),
            Some(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(persisted(&store).as_deref(), Some("[]"));

        assert!(c.remove(&id("m1")));
        assert!(c.last_write_error().is_none());
    }
}
