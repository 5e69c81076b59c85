//! In-memory engine backed by a `BTreeMap`.

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::RwLock;

use plexstore_core::{results_from_entries, Datastore, Entry, Error, Key, Query, QueryResults};

/// An in-memory store. Queries iterate a point-in-time snapshot, so
/// concurrent writers never invalidate a running iteration.
#[derive(Default)]
pub struct MemDatastore {
    map: RwLock<BTreeMap<Key, Bytes>>,
}

impl MemDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl Datastore for MemDatastore {
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error> {
        Ok(self.map.read().get(key).cloned())
    }

    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error> {
        self.map.write().insert(key.clone(), value);
        Ok(())
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        self.map.write().remove(key);
        Ok(())
    }

    fn has(&self, key: &Key) -> Result<bool, Error> {
        Ok(self.map.read().contains_key(key))
    }

    fn query(&self, query: Query) -> Result<QueryResults, Error> {
        let entries: Vec<Entry> = self
            .map
            .read()
            .iter()
            .map(|(k, v)| Entry {
                key: k.clone(),
                value: v.clone(),
            })
            .collect();
        Ok(results_from_entries(&query, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexstore_core::key;

    #[test]
    fn round_trip() {
        let store = MemDatastore::new();
        store
            .put(&key!("users/alice"), Bytes::from_static(b"a"))
            .unwrap();

        assert_eq!(
            store.get(&key!("users/alice")).unwrap().unwrap(),
            Bytes::from_static(b"a")
        );
        assert!(store.has(&key!("users/alice")).unwrap());
        assert!(store.get(&key!("users/bob")).unwrap().is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemDatastore::new();
        store.put(&key!("k"), Bytes::from_static(b"v")).unwrap();
        store.delete(&key!("k")).unwrap();
        store.delete(&key!("k")).unwrap();
        assert!(!store.has(&key!("k")).unwrap());
    }

    #[test]
    fn query_is_ordered_and_prefixed() {
        let store = MemDatastore::new();
        store.put(&key!("b/2"), Bytes::from_static(b"3")).unwrap();
        store.put(&key!("b/1"), Bytes::from_static(b"2")).unwrap();
        store.put(&key!("a/1"), Bytes::from_static(b"1")).unwrap();

        let keys: Vec<String> = store
            .query(Query::prefixed(key!("b")))
            .unwrap()
            .map(|r| r.unwrap().key.to_string())
            .collect();
        assert_eq!(keys, vec!["/b/1", "/b/2"]);
    }

    #[test]
    fn query_snapshot_survives_concurrent_writes() {
        let store = MemDatastore::new();
        store.put(&key!("a"), Bytes::from_static(b"1")).unwrap();

        let results = store.query(Query::all()).unwrap();
        store.put(&key!("b"), Bytes::from_static(b"2")).unwrap();

        // The snapshot taken before the write is unaffected.
        assert_eq!(results.count(), 1);
        assert_eq!(store.len(), 2);
    }
}
