//! The served snapshot and its lock.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The data currently being served: ConfigMap key to value.
pub type Snapshot = BTreeMap<String, String>;

/// Holds the single current [`Snapshot`].
///
/// One writer (the synchronizer) and any number of readers (HTTP handlers)
/// share one exclusive lock. Updates always install a complete map, so a
/// reader sees either the old snapshot or the new one, never a mix.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Mutex<Snapshot>,
}

impl SnapshotStore {
    /// Create a store that starts out serving `initial`.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    /// Copy of the current snapshot.
    pub fn read(&self) -> Snapshot {
        self.lock().clone()
    }

    /// Atomically install `next`, dropping every key of the previous snapshot.
    pub fn replace(&self, next: Snapshot) {
        *self.lock() = next;
    }

    /// Number of keys currently served.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The guarded map is only ever assigned whole, so a poisoned lock still
    // holds a complete snapshot.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn snapshot(pairs: &[(&str, &str)]) -> Snapshot {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_replace_is_not_a_merge() {
        let store = SnapshotStore::new(snapshot(&[("a", "1"), ("b", "2")]));
        store.replace(snapshot(&[("c", "3")]));
        assert_eq!(store.read(), snapshot(&[("c", "3")]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_default_store_is_empty() {
        let store = SnapshotStore::default();
        assert!(store.is_empty());
        assert_eq!(store.read(), Snapshot::new());
    }

    #[test]
    fn test_concurrent_reads_never_see_mixed_snapshots() {
        // Two snapshots with disjoint key sets; every read must equal one of them.
        let left = snapshot(&[("l1", "x"), ("l2", "x"), ("l3", "x")]);
        let right = snapshot(&[("r1", "y"), ("r2", "y")]);
        let store = Arc::new(SnapshotStore::new(left.clone()));

        let writer = {
            let store = store.clone();
            let (left, right) = (left.clone(), right.clone());
            thread::spawn(move || {
                for i in 0..2_000 {
                    store.replace(if i % 2 == 0 { right.clone() } else { left.clone() });
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let (left, right) = (left.clone(), right.clone());
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let seen = store.read();
                        assert!(seen == left || seen == right, "torn read: {:?}", seen);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_poisoned_lock_still_serves_last_snapshot() {
        let store = Arc::new(SnapshotStore::new(snapshot(&[("k", "v")])));
        let poisoner = store.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.current.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert_eq!(store.read(), snapshot(&[("k", "v")]));
        store.replace(Snapshot::new());
        assert!(store.is_empty());
    }
}
