//! Mutual exclusion scoped to a key
//!
//! [`KeyLockManager`] hands out one async mutex per key. Callers holding the same key run one
//! at a time, callers holding different keys never wait on each other.
//!
//! # Registry
//!
//! Locks live in a `DashMap` and are created on first use through `entry().or_insert_with()`.
//! The entry API holds the shard's write lock while it looks up and inserts, so two tasks
//! racing on an unseen key always end up cloning the same `Arc`.
//!
//! Every task that is waiting for or holding a key owns a clone of that key's `Arc`. When a
//! task lets go, it removes the entry with `remove_if` if the map's own reference is the last
//! one left. The registry therefore only contains keys with operations in flight.

use dashmap::DashMap;
use std::{fmt::Debug, future::Future, hash::Hash, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-key async locks
#[derive(Debug)]
pub struct KeyLockManager<K>
where
    K: Eq + Hash,
{
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K> KeyLockManager<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Wait until `key` is free and hold it until the returned guard is dropped
    ///
    /// There is no timeout. Dropping the returned future while it waits gives up the place in
    /// line without affecting other callers.
    pub async fn lock(&self, key: K) -> KeyLockGuard<'_, K> {
        let (slot, mutex) = Slot::register(self, key);
        let guard = mutex.lock_owned().await;

        KeyLockGuard {
            _guard: guard,
            _slot: slot,
        }
    }

    /// Run `action` while holding the lock for `key`
    ///
    /// The lock is released once `action` completes, whatever it returns.
    pub async fn with_lock<F, Fut, T>(&self, key: K, action: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.lock(key).await;
        action().await
    }

    /// Number of keys that currently have a holder or a waiter
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Atomic get-or-create of the lock for `key`
    fn lock_for(&self, key: &K) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the entry for `key` if nobody but the registry references it anymore
    fn evict(&self, key: &K) {
        if self
            .locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1)
            .is_some()
        {
            tracing::trace!(?key, "evicted idle key lock");
        }
    }
}

impl<K> Default for KeyLockManager<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A task's claim on a registry entry
///
/// Keeps the entry alive while the task waits or holds the lock, and tries to evict it on drop.
struct Slot<'a, K>
where
    K: Eq + Hash + Clone + Debug,
{
    manager: &'a KeyLockManager<K>,
    key: K,
    mutex: Option<Arc<Mutex<()>>>,
}

impl<'a, K> Slot<'a, K>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Claim the entry for `key`, returning a second handle to its mutex for locking
    fn register(manager: &'a KeyLockManager<K>, key: K) -> (Self, Arc<Mutex<()>>) {
        let mutex = manager.lock_for(&key);
        let slot = Self {
            manager,
            key,
            mutex: Some(mutex.clone()),
        };
        (slot, mutex)
    }
}

impl<K> Drop for Slot<'_, K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn drop(&mut self) {
        drop(self.mutex.take());
        self.manager.evict(&self.key);
    }
}

/// Exclusive hold on one key of a [`KeyLockManager`]
///
/// Released on drop.
#[must_use = "the key is unlocked as soon as the guard is dropped"]
pub struct KeyLockGuard<'a, K>
where
    K: Eq + Hash + Clone + Debug,
{
    // Field order matters: the mutex must be unlocked before the slot tries to evict.
    _guard: OwnedMutexGuard<()>,
    _slot: Slot<'a, K>,
}
