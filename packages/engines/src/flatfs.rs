//! Sharded flat-file engine: one file per key under a sharded
//! directory layout.
//!
//! Keys must be single-segment (the usual content under a mount
//! prefix, e.g. block identifiers); nested keys are rejected. Each
//! value lives in `<root>/<shard>/<name>.data`, where the shard
//! directory comes from the store's [`ShardFunc`]. The shard function
//! is persisted in a `SHARDING` marker file at the root and verified
//! on reopen.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;
use walkdir::WalkDir;

use plexstore_core::{results_from_entries, Datastore, Entry, Error, Key, Query, QueryResults};

use crate::shard::ShardFunc;

const SHARDING_FILE: &str = "SHARDING";
const DATA_EXT: &str = "data";

/// Flat-file store sharded by a [`ShardFunc`].
///
/// With `sync` enabled every write is fsynced before the atomic
/// rename into place.
#[derive(Debug)]
pub struct FlatfsDatastore {
    dir: PathBuf,
    shard: ShardFunc,
    sync: bool,
}

impl FlatfsDatastore {
    /// Create the store directory if needed and open it.
    ///
    /// A fresh directory gets a `SHARDING` marker recording the shard
    /// function; reopening verifies the configured function against
    /// the marker and fails on mismatch.
    pub fn create_or_open(dir: PathBuf, shard: ShardFunc, sync: bool) -> Result<Self, Error> {
        fs::create_dir_all(&dir)?;

        let marker = dir.join(SHARDING_FILE);
        match fs::read_to_string(&marker) {
            Ok(existing) => {
                let on_disk = ShardFunc::parse(existing.trim())
                    .map_err(|e| Error::backend("flatfs", e))?;
                if on_disk != shard {
                    return Err(Error::backend(
                        "flatfs",
                        format!(
                            "shard function mismatch: configured {shard}, directory uses {on_disk}"
                        ),
                    ));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&marker, format!("{shard}\n"))?;
            }
            Err(e) => return Err(e.into()),
        }

        debug!(dir = %dir.display(), %shard, sync, "opened flatfs datastore");
        Ok(Self { dir, shard, sync })
    }

    /// The key's on-disk file name, or an error for keys this layout
    /// cannot hold.
    fn file_name(&self, key: &Key) -> Result<String, Error> {
        match key.segments() {
            [name] if !name.starts_with('.') => Ok(name.clone()),
            _ => Err(Error::backend(
                "flatfs",
                format!("key not supported by flat layout: {key}"),
            )),
        }
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(self.shard.shard(name))
            .join(format!("{name}.{DATA_EXT}"))
    }

    fn write_file(&self, path: &Path, value: &[u8]) -> Result<(), Error> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

        let parent = path.parent().unwrap_or(&self.dir);
        fs::create_dir_all(parent)?;

        // Write-then-rename keeps readers from ever seeing a torn
        // file; the counter keeps concurrent writers off each other's
        // temp files.
        let tmp = parent.join(format!(
            ".put-{}.tmp",
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let mut file = fs::File::create(&tmp)?;
        file.write_all(value)?;
        if self.sync {
            file.sync_all()?;
        }
        drop(file);
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl Datastore for FlatfsDatastore {
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error> {
        let name = self.file_name(key)?;
        match fs::read(self.file_path(&name)) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error> {
        let name = self.file_name(key)?;
        self.write_file(&self.file_path(&name), &value)
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        let name = self.file_name(key)?;
        match fs::remove_file(self.file_path(&name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn has(&self, key: &Key) -> Result<bool, Error> {
        let name = self.file_name(key)?;
        match fs::metadata(self.file_path(&name)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn query(&self, query: Query) -> Result<QueryResults, Error> {
        let mut entries = Vec::new();
        for item in WalkDir::new(&self.dir).min_depth(2).max_depth(2) {
            let item = item.map_err(|e| Error::backend("flatfs", e))?;
            if !item.file_type().is_file() {
                continue;
            }
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DATA_EXT) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let key = Key::from_segments([name]);
            if !query.matches(&key) {
                // Skip the read for keys the query filters out anyway.
                continue;
            }
            let value = Bytes::from(fs::read(path)?);
            entries.push(Entry { key, value });
        }
        Ok(results_from_entries(&query, entries))
    }
}
