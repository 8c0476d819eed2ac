use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::StorageError;

/// Narrow string key-value capability (the `localStorage` surface).
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Single-threaded shared handle to one backing store.
///
/// The completion set, display settings and control state all write through
/// the same store; last write wins.
pub type SharedStore = Rc<RefCell<dyn KeyValueStore>>;

pub fn shared<S: KeyValueStore + 'static>(store: S) -> SharedStore {
    Rc::new(RefCell::new(store))
}

/// In-memory store, optionally with a byte quota to exercise failure paths.
///
/// The quota counts the UTF-8 length of every key plus value.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    items: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota_bytes {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::KeyValueStore;
    use crate::StorageError;
    use wasm_bindgen::{JsCast, JsValue};

    /// `window.localStorage` backed store.
    #[derive(Debug)]
    pub struct LocalStorageStore {
        storage: web_sys::Storage,
    }

    impl LocalStorageStore {
        pub fn new() -> Result<Self, StorageError> {
            Ok(Self {
                storage: window_local_storage()?,
            })
        }
    }

    impl KeyValueStore for LocalStorageStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage
                .get_item(key)
                .map_err(|e| StorageError::Io(format!("get_item({key}) failed: {:?}", e)))
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage
                .set_item(key, value)
                .map_err(|e| classify_write_error(key, value.len(), e))
        }

        fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
            self.storage
                .remove_item(key)
                .map_err(|e| StorageError::Io(format!("remove_item({key}) failed: {:?}", e)))
        }
    }

    fn classify_write_error(key: &str, needed: usize, e: JsValue) -> StorageError {
        let quota = e
            .dyn_ref::<js_sys::Error>()
            .map(|err| String::from(err.name()) == "QuotaExceededError")
            .unwrap_or(false);
        if quota {
            // Browsers do not expose the limit.
            return StorageError::QuotaExceeded {
                key: key.to_string(),
                needed,
                limit: 0,
            };
        }
        StorageError::Io(format!("set_item({key}) failed: {:?}", e))
    }

    fn window_local_storage() -> Result<web_sys::Storage, StorageError> {
        let win = web_sys::window().ok_or(StorageError::Unavailable)?;
        win.local_storage()
            .map_err(|e| StorageError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageStore {
    pub fn new() -> Result<Self, StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for LocalStorageStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove_item(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryStore, KeyValueStore, LocalStorageStore, shared};
    use crate::StorageError;

    #[test]
    fn set_get_remove() {
        let mut s = InMemoryStore::new();
        assert_eq!(s.get_item("k").unwrap(), None);
        s.set_item("k", "v").unwrap();
        assert_eq!(s.get_item("k").unwrap().as_deref(), Some("v"));
        s.remove_item("k").unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn quota_rejects_oversized_writes_and_keeps_old_value() {
        let mut s = InMemoryStore::with_quota(8);
        s.set_item("k", "1234").unwrap();
        let err = s.set_item("k", "123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 8, .. }));
        assert_eq!(s.get_item("k").unwrap().as_deref(), Some("1234"));
        // Overwriting the same key only counts the new value.
        s.set_item("k", "1234567").unwrap();
    }

    #[test]
    fn shared_store_is_visible_through_clones() {
        let a = shared(InMemoryStore::new());
        let b = a.clone();
        a.borrow_mut().set_item("x", "1").unwrap();
        assert_eq!(b.borrow().get_item("x").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn local_storage_is_unavailable_off_wasm() {
        assert_eq!(LocalStorageStore::new().unwrap_err(), StorageError::Unavailable);
    }
}
