//! Per-category write serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// One mutex per category, created on first use and dropped once nobody
/// holds or waits for it.
///
/// Holding a category's lock across the read and the commit keeps two
/// resequencings of the same category from interleaving. Different categories
/// never contend.
#[derive(Debug, Default)]
pub struct GroupLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl GroupLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `category_id`.
    pub fn with_lock<T>(&self, category_id: &str, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(category_id.to_string()).or_default())
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        self.release(category_id, &lock);
        result
    }

    /// Forget the category's entry if only the map and `lock` still refer to it.
    /// Clones are only taken under the map lock, so the count cannot grow here.
    fn release(&self, category_id: &str, lock: &Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let unused = locks
            .get(category_id)
            .is_some_and(|held| Arc::ptr_eq(held, lock) && Arc::strong_count(lock) == 2);
        if unused {
            locks.remove(category_id);
        }
    }

    /// Number of categories currently locked or waited on.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
