//! redb-backed engine adapter.

use std::fs;
use std::path::PathBuf;

use bytes::Bytes;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use plexstore_core::{results_from_entries, Datastore, Entry, Error, Key, Query, QueryResults};

const TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("plexstore");
const DB_FILE: &str = "plexstore.redb";

fn redb_err(e: impl std::fmt::Display) -> Error {
    Error::backend("redb", e)
}

/// Adapter over a [`redb::Database`].
///
/// `path` names a directory (created if absent) holding the database
/// file, so a descriptor can point at a data directory the same way
/// the other disk engines do. The single table is created eagerly at
/// open, which keeps read transactions from ever racing table
/// creation.
pub struct RedbDatastore {
    db: Database,
}

impl RedbDatastore {
    /// Open (or create) the database under the `path` directory.
    pub fn open(path: PathBuf) -> Result<Self, Error> {
        fs::create_dir_all(&path)?;
        let db = Database::create(path.join(DB_FILE)).map_err(redb_err)?;

        let tx = db.begin_write().map_err(redb_err)?;
        tx.open_table(TABLE).map_err(redb_err)?;
        tx.commit().map_err(redb_err)?;

        debug!(path = %path.display(), "opened redb datastore");
        Ok(Self { db })
    }

    fn encode(key: &Key) -> Vec<u8> {
        key.to_string().into_bytes()
    }

    fn decode(raw: &[u8]) -> Result<Key, Error> {
        let s = std::str::from_utf8(raw)
            .map_err(|_| Error::backend("redb", "stored key is not valid UTF-8"))?;
        Ok(Key::new(s))
    }
}

impl Datastore for RedbDatastore {
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error> {
        let tx = self.db.begin_read().map_err(redb_err)?;
        let table = tx.open_table(TABLE).map_err(redb_err)?;
        let value = table
            .get(Self::encode(key).as_slice())
            .map_err(redb_err)?;
        Ok(value.map(|guard| Bytes::copy_from_slice(guard.value())))
    }

    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error> {
        let tx = self.db.begin_write().map_err(redb_err)?;
        {
            let mut table = tx.open_table(TABLE).map_err(redb_err)?;
            table
                .insert(Self::encode(key).as_slice(), value.as_ref())
                .map_err(redb_err)?;
        }
        tx.commit().map_err(redb_err)?;
        Ok(())
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        let tx = self.db.begin_write().map_err(redb_err)?;
        {
            let mut table = tx.open_table(TABLE).map_err(redb_err)?;
            table
                .remove(Self::encode(key).as_slice())
                .map_err(redb_err)?;
        }
        tx.commit().map_err(redb_err)?;
        Ok(())
    }

    fn has(&self, key: &Key) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    fn query(&self, query: Query) -> Result<QueryResults, Error> {
        let tx = self.db.begin_read().map_err(redb_err)?;
        let table = tx.open_table(TABLE).map_err(redb_err)?;

        let mut entries = Vec::new();
        for item in table.range::<&[u8]>(..).map_err(redb_err)? {
            let (raw_key, raw_value) = item.map_err(redb_err)?;
            let key = Self::decode(raw_key.value())?;
            if !query.matches(&key) {
                continue;
            }
            entries.push(Entry {
                key,
                value: Bytes::copy_from_slice(raw_value.value()),
            });
        }
        Ok(results_from_entries(&query, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexstore_core::key;
    use tempfile::TempDir;

    #[test]
    fn creates_directory_if_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/data");
        let _store = RedbDatastore::open(path.clone()).unwrap();
        assert!(path.join("plexstore.redb").is_file());
    }

    #[test]
    fn round_trip() {
        let dir = TempDir::new().unwrap();
        let store = RedbDatastore::open(dir.path().join("db")).unwrap();

        store.put(&key!("a/k"), Bytes::from_static(b"v")).unwrap();
        assert_eq!(
            store.get(&key!("a/k")).unwrap().unwrap(),
            Bytes::from_static(b"v")
        );
        assert!(store.has(&key!("a/k")).unwrap());
        store.delete(&key!("a/k")).unwrap();
        assert!(!store.has(&key!("a/k")).unwrap());
    }

    #[test]
    fn query_on_fresh_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = RedbDatastore::open(dir.path().join("db")).unwrap();
        assert_eq!(store.query(Query::all()).unwrap().count(), 0);
    }

    #[test]
    fn query_is_ordered() {
        let dir = TempDir::new().unwrap();
        let store = RedbDatastore::open(dir.path().join("db")).unwrap();
        store.put(&key!("b"), Bytes::from_static(b"2")).unwrap();
        store.put(&key!("a"), Bytes::from_static(b"1")).unwrap();

        let keys: Vec<String> = store
            .query(Query::all())
            .unwrap()
            .map(|r| r.unwrap().key.to_string())
            .collect();
        assert_eq!(keys, vec!["/a", "/b"]);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");
        {
            let store = RedbDatastore::open(path.clone()).unwrap();
            store.put(&key!("k"), Bytes::from_static(b"v")).unwrap();
        }
        let store = RedbDatastore::open(path).unwrap();
        assert_eq!(
            store.get(&key!("k")).unwrap().unwrap(),
            Bytes::from_static(b"v")
        );
    }
}
