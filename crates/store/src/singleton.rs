use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use fintrack_core::UserId;

/// At-most-one-row-per-owner store (e.g. the monthly budget).
///
/// `upsert` converges repeated set calls to a single row instead of
/// erroring, keyed by the owner alone.
pub trait SingletonStore<V>: Send + Sync {
    fn get(&self, owner: UserId) -> Option<V>;

    fn upsert(&self, owner: UserId, value: V) -> V;

    /// Atomically remove the owner's row; `false` when none exists.
    fn remove(&self, owner: UserId) -> bool;
}

impl<V, S> SingletonStore<V> for Arc<S>
where
    S: SingletonStore<V> + ?Sized,
{
    fn get(&self, owner: UserId) -> Option<V> {
        (**self).get(owner)
    }

    fn upsert(&self, owner: UserId, value: V) -> V {
        (**self).upsert(owner, value)
    }

    fn remove(&self, owner: UserId) -> bool {
        (**self).remove(owner)
    }
}

/// In-memory singleton store for dev/tests.
#[derive(Debug)]
pub struct InMemorySingletonStore<V> {
    inner: RwLock<HashMap<UserId, V>>,
}

impl<V> InMemorySingletonStore<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for InMemorySingletonStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SingletonStore<V> for InMemorySingletonStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, owner: UserId) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(&owner).cloned()
    }

    fn upsert(&self, owner: UserId, value: V) -> V {
        if let Ok(mut map) = self.inner.write() {
            map.insert(owner, value.clone());
        }
        value
    }

    fn remove(&self, owner: UserId) -> bool {
        match self.inner.write() {
            Ok(mut map) => map.remove(&owner).is_some(),
            Err(_) => false,
        }
    }
}
