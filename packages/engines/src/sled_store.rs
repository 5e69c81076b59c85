//! sled-backed LSM engine adapter.

use std::path::PathBuf;

use bytes::Bytes;
use tracing::debug;

use plexstore_core::{results_from_entries, Datastore, Entry, Error, Key, Query, QueryResults};

/// Value compression mode for [`SledDatastore`].
///
/// sled ships a single builtin codec, so the mode only toggles
/// compression: [`Compression::None`] disables it, everything else
/// enables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// The engine's default codec.
    #[default]
    Default,
    /// No compression.
    None,
    /// Snappy-class compression (mapped onto sled's builtin codec).
    Snappy,
}

/// Adapter over a [`sled::Db`].
///
/// Keys are stored as their textual `/a/b` form; queries materialize a
/// snapshot and re-sort it segment-wise, since sled iterates in raw
/// byte order.
pub struct SledDatastore {
    db: sled::Db,
}

impl SledDatastore {
    /// Open (or create) a sled database at `path`.
    pub fn open(path: PathBuf, compression: Compression) -> Result<Self, Error> {
        let db = sled::Config::new()
            .path(&path)
            .use_compression(compression != Compression::None)
            .open()
            .map_err(|e| Error::backend("sled", e))?;
        debug!(path = %path.display(), ?compression, "opened sled datastore");
        Ok(Self { db })
    }

    fn encode(key: &Key) -> Vec<u8> {
        key.to_string().into_bytes()
    }

    fn decode(raw: &[u8]) -> Result<Key, Error> {
        let s = std::str::from_utf8(raw)
            .map_err(|_| Error::backend("sled", "stored key is not valid UTF-8"))?;
        Ok(Key::new(s))
    }
}

impl Datastore for SledDatastore {
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error> {
        let value = self
            .db
            .get(Self::encode(key))
            .map_err(|e| Error::backend("sled", e))?;
        Ok(value.map(|v| Bytes::copy_from_slice(&v)))
    }

    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error> {
        self.db
            .insert(Self::encode(key), value.to_vec())
            .map_err(|e| Error::backend("sled", e))?;
        Ok(())
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        self.db
            .remove(Self::encode(key))
            .map_err(|e| Error::backend("sled", e))?;
        Ok(())
    }

    fn has(&self, key: &Key) -> Result<bool, Error> {
        self.db
            .contains_key(Self::encode(key))
            .map_err(|e| Error::backend("sled", e))
    }

    fn query(&self, query: Query) -> Result<QueryResults, Error> {
        let mut entries = Vec::new();
        for item in self.db.iter() {
            let (raw_key, raw_value) = item.map_err(|e| Error::backend("sled", e))?;
            let key = Self::decode(&raw_key)?;
            if !query.matches(&key) {
                continue;
            }
            entries.push(Entry {
                key,
                value: Bytes::copy_from_slice(&raw_value),
            });
        }
        Ok(results_from_entries(&query, entries))
    }

    fn close(&self) -> Result<(), Error> {
        self.db.flush().map_err(|e| Error::backend("sled", e))?;
        Ok(())
    }
}
