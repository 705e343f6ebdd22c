use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::RwLock;

use fintrack_core::UserId;

/// Owner-scoped key/value store for per-owner resource records.
///
/// Update and removal are single match-and-modify operations filtered by
/// `(owner, key)`: a zero-match result is one `None`/`false` outcome whether
/// the key never existed or belongs to someone else, so callers cannot
/// distinguish (and cannot race) the two cases.
pub trait OwnedStore<K, V>: Send + Sync {
    fn get(&self, owner: UserId, key: &K) -> Option<V>;

    fn insert(&self, owner: UserId, key: K, value: V);

    /// Atomically mutate the row matching `(owner, key)`, returning the
    /// updated value, or `None` when no such row exists under this owner.
    fn update(&self, owner: UserId, key: &K, f: &mut dyn FnMut(&mut V)) -> Option<V>;

    /// Atomically remove the row matching `(owner, key)`; `false` when no
    /// such row exists under this owner.
    fn remove(&self, owner: UserId, key: &K) -> bool;

    fn list(&self, owner: UserId) -> Vec<V>;
}

impl<K, V, S> OwnedStore<K, V> for Arc<S>
where
    S: OwnedStore<K, V> + ?Sized,
{
    fn get(&self, owner: UserId, key: &K) -> Option<V> {
        (**self).get(owner, key)
    }

    fn insert(&self, owner: UserId, key: K, value: V) {
        (**self).insert(owner, key, value)
    }

    fn update(&self, owner: UserId, key: &K, f: &mut dyn FnMut(&mut V)) -> Option<V> {
        (**self).update(owner, key, f)
    }

    fn remove(&self, owner: UserId, key: &K) -> bool {
        (**self).remove(owner, key)
    }

    fn list(&self, owner: UserId) -> Vec<V> {
        (**self).list(owner)
    }
}

/// In-memory owner-scoped store for dev/tests.
#[derive(Debug)]
pub struct InMemoryOwnedStore<K, V> {
    inner: RwLock<HashMap<(UserId, K), V>>,
}

impl<K, V> InMemoryOwnedStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryOwnedStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OwnedStore<K, V> for InMemoryOwnedStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, owner: UserId, key: &K) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(&(owner, key.clone())).cloned()
    }

    fn insert(&self, owner: UserId, key: K, value: V) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((owner, key), value);
        }
    }

    fn update(&self, owner: UserId, key: &K, f: &mut dyn FnMut(&mut V)) -> Option<V> {
        let mut map = self.inner.write().ok()?;
        let value = map.get_mut(&(owner, key.clone()))?;
        f(value);
        Some(value.clone())
    }

    fn remove(&self, owner: UserId, key: &K) -> bool {
        match self.inner.write() {
            Ok(mut map) => map.remove(&(owner, key.clone())).is_some(),
            Err(_) => false,
        }
    }

    fn list(&self, owner: UserId) -> Vec<V> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        map.iter()
            .filter_map(|((o, _k), v)| if *o == owner { Some(v.clone()) } else { None })
            .collect()
    }
}
