//! The shared environment store every namespace reads and writes.
//!
//! The store is a plain string-to-string mapping behind the [`EnvStore`]
//! trait. [`ProcessStore`] is backed by the real process environment;
//! [`MemoryStore`] keeps an isolated map, which tests and embedders can
//! inject instead of touching process state. A store handle is shared by
//! reference (`Rc<dyn EnvStore>`), so every namespace over the same
//! handle observes the same data. Execution is single-threaded by
//! design; there is no locking.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A mutable string-keyed key/value store representing the environment.
pub trait EnvStore {
    /// Current value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;

    /// Set `key` to `value`, overwriting any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str);

    /// Every key currently in the store, in the store's iteration order.
    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Store backed by the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessStore;

impl EnvStore for ProcessStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn remove(&self, key: &str) {
        std::env::remove_var(key);
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = std::env::vars().map(|(key, _)| key).collect();
        // std::env::vars has no guaranteed order.
        keys.sort();
        keys
    }
}

/// In-memory store with no connection to the process environment.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EnvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

/// Shared handle to the process environment.
pub fn process() -> Rc<dyn EnvStore> {
    Rc::new(ProcessStore)
}

/// Shared handle to a fresh in-memory store.
pub fn memory() -> Rc<dyn EnvStore> {
    Rc::new(MemoryStore::new())
}
