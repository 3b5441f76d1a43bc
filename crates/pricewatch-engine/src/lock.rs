//! Process-local category refresh lock.
//!
//! Best-effort mutual exclusion: a category already under refresh rejects
//! a second request immediately instead of queueing it. This is not a
//! distributed lock — the engine assumes a single process instance.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared lock table. Cheap to clone; clones share the same set. Injected
/// into the orchestrator rather than living as module-global state so
/// tests can run against independent instances.
#[derive(Clone, Default)]
pub struct CategoryLocks {
    held: Arc<Mutex<HashSet<String>>>,
}

impl CategoryLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically test-and-set the category. Returns `None` when a refresh
    /// for this category is already running; the returned guard releases
    /// the slot on drop, so cleanup runs on success, failure, and unwind
    /// alike.
    #[must_use]
    pub fn try_acquire(&self, category: &str) -> Option<CategoryGuard> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        if !held.insert(category.to_string()) {
            return None;
        }
        Some(CategoryGuard {
            category: category.to_string(),
            held: Arc::clone(&self.held),
        })
    }

    /// Whether a refresh currently holds this category.
    #[must_use]
    pub fn is_held(&self, category: &str) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(category)
    }
}

/// Holds one category slot; dropping it releases the slot.
pub struct CategoryGuard {
    category: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl Drop for CategoryGuard {
    fn drop(&mut self) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.category);
    }
}
