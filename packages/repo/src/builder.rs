//! Recursive construction of a store hierarchy from a descriptor tree.

use std::path::{Path, PathBuf};

use tracing::debug;

use plexstore_core::{
    DatastoreBox, LogDatastore, MeasureDatastore, Mount, MountStore,
};
use plexstore_engines::{FlatfsDatastore, MemDatastore, RedbDatastore, SledDatastore};

use crate::error::SpecError;
use crate::spec::DatastoreSpec;

/// Build the store tree a descriptor describes.
///
/// Construction is depth-first: a composite node's children are built
/// before the node itself, and the first child failure aborts the
/// whole build with that child's error.
///
/// Relative `path` fields are resolved against `root`; absolute paths
/// are taken as-is.
pub fn build(spec: &DatastoreSpec, root: &Path) -> Result<DatastoreBox, SpecError> {
    match spec {
        DatastoreSpec::Mount { mounts } => {
            let mut built = Vec::with_capacity(mounts.len());
            for mount in mounts {
                built.push(Mount {
                    prefix: mount.mountpoint.clone(),
                    store: build(&mount.spec, root)?,
                });
            }
            debug!(mounts = built.len(), "built mount datastore");
            Ok(Box::new(MountStore::new(built)))
        }
        DatastoreSpec::Flatfs { path, shard, sync } => {
            let dir = resolve_path(root, path);
            let store = FlatfsDatastore::create_or_open(dir, *shard, *sync)?;
            Ok(Box::new(store))
        }
        DatastoreSpec::Mem => Ok(Box::new(MemDatastore::new())),
        DatastoreSpec::Log { name, child } => {
            let child = build(child, root)?;
            Ok(Box::new(LogDatastore::new(name.clone(), child)))
        }
        DatastoreSpec::Measure { prefix, child } => {
            let child = build(child, root)?;
            Ok(Box::new(MeasureDatastore::new(prefix.clone(), child)))
        }
        DatastoreSpec::Sled { path, compression } => {
            let store = SledDatastore::open(resolve_path(root, path), *compression)?;
            Ok(Box::new(store))
        }
        DatastoreSpec::Redb { path } => {
            let store = RedbDatastore::open(resolve_path(root, path))?;
            Ok(Box::new(store))
        }
    }
}

fn resolve_path(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
