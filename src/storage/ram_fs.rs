//! In-memory file registry.
//!
//! A `RamFs` is a handle to a name → bytes map shared by every clone of the
//! handle. All access goes through one reentrant lock, so a store made from
//! inside another registry call on the same thread does not deadlock.

use parking_lot::ReentrantMutex;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::Arc;

type Registry = FxHashMap<String, Arc<Vec<u8>>>;

/// Shared registry of RAM files keyed by their full (prefixed) name.
#[derive(Clone, Default)]
pub struct RamFs {
    inner: Arc<ReentrantMutex<RefCell<Registry>>>,
}

impl RamFs {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under `name`, replacing any previous content.
    pub fn store(&self, name: &str, data: Vec<u8>) {
        let guard = self.inner.lock();
        guard.borrow_mut().insert(name.to_string(), Arc::new(data));
    }

    pub fn exists(&self, name: &str) -> bool {
        let guard = self.inner.lock();
        let exists = guard.borrow().contains_key(name);
        exists
    }

    /// Shared view of the content of `name`, if present.
    pub fn content(&self, name: &str) -> Option<Arc<Vec<u8>>> {
        let guard = self.inner.lock();
        let content = guard.borrow().get(name).cloned();
        content
    }

    /// Size in bytes of `name`; 0 when absent.
    pub fn file_size(&self, name: &str) -> usize {
        self.content(name).map(|c| c.len()).unwrap_or(0)
    }

    /// Remove `name`. Returns whether it existed.
    pub fn remove(&self, name: &str) -> bool {
        let guard = self.inner.lock();
        let removed = guard.borrow_mut().remove(name).is_some();
        removed
    }

    /// Move the content of `old` to `new`. Returns whether `old` existed.
    pub fn rename(&self, old: &str, new: &str) -> bool {
        let guard = self.inner.lock();
        let mut map = guard.borrow_mut();
        match map.remove(old) {
            Some(data) => {
                map.insert(new.to_string(), data);
                true
            }
            None => false,
        }
    }

    /// Names of all files currently held, sorted.
    pub fn names(&self) -> Vec<String> {
        let guard = self.inner.lock();
        let mut names: Vec<String> = guard.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Total bytes held by the registry.
    pub fn total_bytes(&self) -> usize {
        let guard = self.inner.lock();
        let total = guard.borrow().values().map(|v| v.len()).sum();
        total
    }

    /// Number of handles sharing this registry.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl std::fmt::Debug for RamFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RamFs")
            .field("files", &self.names())
            .field("bytes", &self.total_bytes())
            .finish()
    }
}
