//! A keyed collection of independently locked rooms.
//!
//! Two levels of locking: the map lock is only held long enough to find
//! (or insert) a room; each room then has its own lock, so work in room A
//! never waits on room B. A room's lock covers the whole
//! check-then-mutate-then-notify sequence of one operation, which is what
//! makes racing joins for the same seat safe.

use std::collections::HashMap;
use std::sync::Arc;

use gambit_protocol::RoomKey;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub(crate) struct Registry<R> {
    rooms: Mutex<HashMap<RoomKey, Arc<Mutex<R>>>>,
}

impl<R: Send + 'static> Registry<R> {
    pub(crate) fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Looks up an existing room. The caller locks it.
    pub(crate) async fn get(&self, key: &RoomKey) -> Option<Arc<Mutex<R>>> {
        self.rooms.lock().await.get(key).cloned()
    }

    /// Locks the room for `key`, creating it with `create` if it's unknown.
    /// Also returns whether it was just created.
    ///
    /// The map lock is released only after the room lock is held, so
    /// eviction can't slip in between the lookup and the caller's update.
    pub(crate) async fn lock_or_create(
        &self,
        key: &RoomKey,
        create: impl FnOnce() -> R,
    ) -> (OwnedMutexGuard<R>, bool) {
        let mut rooms = self.rooms.lock().await;
        let mut created = false;
        let room = rooms
            .entry(key.clone())
            .or_insert_with(|| {
                created = true;
                Arc::new(Mutex::new(create()))
            })
            .clone();
        let guard = room.lock_owned().await;
        drop(rooms);
        (guard, created)
    }

    pub(crate) async fn contains(&self, key: &RoomKey) -> bool {
        self.rooms.lock().await.contains_key(key)
    }

    pub(crate) async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Removes every room `evict` selects and returns their keys.
    ///
    /// Rooms that are locked right now are busy, so they are skipped
    /// rather than waited on.
    pub(crate) async fn evict_where(&self, mut evict: impl FnMut(&R) -> bool) -> Vec<RoomKey> {
        let mut rooms = self.rooms.lock().await;
        let doomed: Vec<RoomKey> = rooms
            .iter()
            .filter(|(_, room)| room.try_lock().is_ok_and(|guard| evict(&*guard)))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            rooms.remove(key);
        }
        doomed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> RoomKey {
        RoomKey::new(raw).unwrap()
    }

    #[tokio::test]
    async fn test_lock_or_create_creates_once() {
        let registry: Registry<u32> = Registry::new();

        let (mut first, created) = registry.lock_or_create(&key("a"), || 1).await;
        assert!(created);
        *first += 1;
        drop(first);

        let (second, created) = registry.lock_or_create(&key("a"), || 100).await;
        assert!(!created);
        assert_eq!(*second, 2);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_returns_none() {
        let registry: Registry<u32> = Registry::new();
        assert!(registry.get(&key("missing")).await.is_none());
        assert!(!registry.contains(&key("missing")).await);
    }

    #[tokio::test]
    async fn test_evict_where_removes_selected_rooms() {
        let registry: Registry<u32> = Registry::new();
        drop(registry.lock_or_create(&key("keep"), || 1).await);
        drop(registry.lock_or_create(&key("drop"), || 0).await);

        let evicted = registry.evict_where(|value| *value == 0).await;

        assert_eq!(evicted, vec![key("drop")]);
        assert!(registry.contains(&key("keep")).await);
        assert!(!registry.contains(&key("drop")).await);
    }

    #[tokio::test]
    async fn test_evict_where_skips_locked_rooms() {
        let registry: Registry<u32> = Registry::new();
        let (held, _) = registry.lock_or_create(&key("busy"), || 0).await;

        let evicted = registry.evict_where(|_| true).await;

        assert!(evicted.is_empty());
        drop(held);
        assert_eq!(registry.evict_where(|_| true).await, vec![key("busy")]);
    }
}
