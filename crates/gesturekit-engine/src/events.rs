//! Listener registry with snapshot dispatch.
//!
//! Observers are held behind [`Arc`] and keyed by a [`ListenerKey`]
//! handed out at registration. Dispatchers clone the current set before
//! notifying, so a listener that (de)registers others mid-dispatch never
//! invalidates the iteration; delivery order across observers is
//! unspecified.

use std::sync::Arc;

use gesturekit_core::ListenerKey;

/// Identity-keyed set of shared observers.
pub struct ListenerSet<T: ?Sized> {
    entries: Vec<(ListenerKey, Arc<T>)>,
    next_key: u64,
}

impl<T: ?Sized> ListenerSet<T> {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_key: 0,
        }
    }

    /// Register a listener and return its deregistration key.
    pub fn add(&mut self, listener: Arc<T>) -> ListenerKey {
        let key = ListenerKey::from_raw(self.next_key);
        self.next_key += 1;
        self.entries.push((key, listener));
        key
    }

    /// Deregister by key. Returns `true` if the listener was present.
    pub fn remove(&mut self, key: ListenerKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.len() != before
    }

    /// Clone the current listener set for dispatch.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
