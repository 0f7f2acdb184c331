//! Type vocabulary shared with the peer
//!
//! Every type that appears in an outbound payload gets a small wire id the
//! first time it is seen. Ids are dense, assigned in first-seen order and
//! never reused. Freshly assigned ids stay marked as new until they are
//! drained, so only the incremental vocabulary needs to travel.

use crate::traits::{LinkError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// One assignment in the map
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeEntry {
    pub name: Arc<str>,
    pub id: u32,
}

#[derive(Default)]
struct Inner {
    ids: HashMap<Arc<str>, u32>,
    /// Indexed by id
    names: Vec<Arc<str>>,
    /// Ids assigned since the last drain, ascending
    unflushed: Vec<u32>,
}

/// Append-only map from type name to wire id
///
/// Safe to share across connections. Lookups of known names take the read
/// lock only; a first sighting takes the write lock and re-checks, so
/// concurrent first use of one name yields a single id and a single
/// `newly_assigned == true`.
#[derive(Default)]
pub struct TypeMap {
    inner: RwLock<Inner>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a map with a vocabulary agreed on earlier
    ///
    /// Ids must cover `0..n` exactly once. Seeded entries are not new.
    pub fn from_entries(entries: impl IntoIterator<Item = TypeEntry>) -> Result<Self> {
        let mut entries: Vec<TypeEntry> = entries.into_iter().collect();
        entries.sort_by_key(|entry| entry.id);

        let mut inner = Inner::default();
        for (expected, entry) in entries.into_iter().enumerate() {
            if entry.name.is_empty() {
                return Err(LinkError::InvalidArgument("type name is empty".into()));
            }
            if entry.id as usize != expected {
                return Err(LinkError::InvalidArgument(format!(
                    "type ids must be dense, expected {} got {}",
                    expected, entry.id
                )));
            }
            if inner.ids.insert(Arc::clone(&entry.name), entry.id).is_some() {
                return Err(LinkError::InvalidArgument(format!(
                    "type {} listed twice",
                    entry.name
                )));
            }
            inner.names.push(entry.name);
        }

        Ok(Self {
            inner: RwLock::new(inner),
        })
    }

    /// Get the id for `name`, assigning the next one on first use
    ///
    /// # Returns
    /// * `Ok((id, true))` - `name` was unseen and now owns `id`
    /// * `Ok((id, false))` - `name` already had `id`
    /// * `Err(LinkError::InvalidArgument)` - `name` is empty
    pub fn resolve_id(&self, name: &str) -> Result<(u32, bool)> {
        if name.is_empty() {
            return Err(LinkError::InvalidArgument("type name is empty".into()));
        }

        if let Some(&id) = self.inner.read().ids.get(name) {
            return Ok((id, false));
        }

        let mut inner = self.inner.write();
        // Another caller may have won between the two locks
        if let Some(&id) = inner.ids.get(name) {
            return Ok((id, false));
        }

        let id = inner.names.len() as u32;
        let name: Arc<str> = Arc::from(name);
        inner.ids.insert(Arc::clone(&name), id);
        inner.names.push(name);
        inner.unflushed.push(id);
        Ok((id, true))
    }

    /// [`resolve_id`](Self::resolve_id) keyed by the Rust type name of `T`
    pub fn resolve<T: ?Sized>(&self) -> Result<(u32, bool)> {
        self.resolve_id(std::any::type_name::<T>())
    }

    /// Take every entry assigned since the previous drain, ascending by id
    pub fn drain_new_entries(&self) -> Vec<TypeEntry> {
        let mut inner = self.inner.write();
        let unflushed = std::mem::take(&mut inner.unflushed);
        unflushed
            .into_iter()
            .map(|id| TypeEntry {
                name: Arc::clone(&inner.names[id as usize]),
                id,
            })
            .collect()
    }

    /// Whether anything is waiting to be drained
    pub fn has_new_entries(&self) -> bool {
        !self.inner.read().unflushed.is_empty()
    }

    pub fn get_id(&self, name: &str) -> Option<u32> {
        self.inner.read().ids.get(name).copied()
    }

    pub fn get_name(&self, id: u32) -> Option<Arc<str>> {
        self.inner.read().names.get(id as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("TypeMap")
            .field("len", &inner.names.len())
            .field("unflushed", &inner.unflushed.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    fn entry(name: &str, id: u32) -> TypeEntry {
        TypeEntry {
            name: Arc::from(name),
            id,
        }
    }

    #[test]
    fn test_empty_name_rejected_without_mutation() {
        let map = TypeMap::new();
        assert!(matches!(map.resolve_id(""), Err(LinkError::InvalidArgument(_))));
        assert!(map.is_empty());
        assert!(map.drain_new_entries().is_empty());
    }

    #[test]
    fn test_first_is_zero() {
        let map = TypeMap::new();
        assert_eq!(map.resolve::<String>().unwrap(), (0, true));
    }

    #[test]
    fn test_repeated_returns_same_id() {
        let map = TypeMap::new();
        let (id, new) = map.resolve::<String>().unwrap();
        assert!(new);

        let (again, new_again) = map.resolve::<String>().unwrap();
        assert_eq!(id, again);
        assert!(!new_again);
    }

    #[test]
    fn test_ids_follow_first_seen_order() {
        let map = TypeMap::new();
        let names = ["alpha", "beta", "gamma", "delta"];
        for (expected, name) in names.iter().enumerate() {
            assert_eq!(map.resolve_id(name).unwrap(), (expected as u32, true));
        }
        // Re-presenting in another order changes nothing
        assert_eq!(map.resolve_id("gamma").unwrap(), (2, false));
        assert_eq!(map.resolve_id("alpha").unwrap(), (0, false));
        assert_eq!(map.len(), 4);
        assert_eq!(map.get_name(3).as_deref(), Some("delta"));
        assert_eq!(map.get_id("beta"), Some(1));
    }

    #[test]
    fn test_drain_returns_new_then_nothing() {
        let map = TypeMap::new();
        map.resolve::<String>().unwrap();
        map.resolve::<i32>().unwrap();
        map.resolve::<String>().unwrap();

        let drained = map.drain_new_entries();
        assert_eq!(
            drained,
            vec![
                entry(std::any::type_name::<String>(), 0),
                entry(std::any::type_name::<i32>(), 1),
            ]
        );
        assert!(map.drain_new_entries().is_empty());
        assert!(!map.has_new_entries());
    }

    #[test]
    fn test_drain_only_since_last_flush() {
        let map = TypeMap::new();
        map.resolve_id("a").unwrap();
        map.drain_new_entries();

        map.resolve_id("a").unwrap();
        map.resolve_id("b").unwrap();
        assert_eq!(map.drain_new_entries(), vec![entry("b", 1)]);
    }

    #[test]
    fn test_from_entries_seeds_without_marking_new() {
        let map = TypeMap::from_entries(vec![entry("b", 1), entry("a", 0)]).unwrap();
        assert!(!map.has_new_entries());
        assert_eq!(map.resolve_id("a").unwrap(), (0, false));
        assert_eq!(map.resolve_id("c").unwrap(), (2, true));
    }

    #[test]
    fn test_from_entries_rejects_gaps_and_duplicates() {
        assert!(TypeMap::from_entries(vec![entry("a", 1)]).is_err());
        assert!(TypeMap::from_entries(vec![entry("a", 0), entry("a", 1)]).is_err());
        assert!(TypeMap::from_entries(vec![entry("", 0)]).is_err());
    }

    #[test]
    fn test_concurrent_first_use_assigns_once() {
        let map = Arc::new(TypeMap::new());
        let barrier = Arc::new(Barrier::new(16));
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let map = Arc::clone(&map);
                let barrier = Arc::clone(&barrier);
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    barrier.wait();
                    let (id, new) = map.resolve_id("contended").unwrap();
                    if new {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                    id
                })
            })
            .collect();

        let ids: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|&id| id == 0));
        assert_eq!(winners.load(Ordering::Relaxed), 1);
        assert_eq!(map.drain_new_entries(), vec![entry("contended", 0)]);
    }

    #[test]
    fn test_concurrent_distinct_names_are_dense() {
        let map = Arc::new(TypeMap::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let map = Arc::clone(&map);
                thread::spawn(move || {
                    for i in 0..50 {
                        map.resolve_id(&format!("t{}-{}", t, i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let drained = map.drain_new_entries();
        assert_eq!(drained.len(), 400);
        for (expected, entry) in drained.iter().enumerate() {
            assert_eq!(entry.id, expected as u32);
            assert_eq!(map.get_id(&entry.name), Some(entry.id));
        }
    }
}
