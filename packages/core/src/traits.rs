//! The uniform key-value contract every store implements.

use bytes::Bytes;

use crate::error::Error;
use crate::key::Key;
use crate::query::{Query, QueryResults};

/// The key-value contract shared by leaf engines, decorators and the
/// mount router.
///
/// Implementations must be safe for concurrent use from multiple
/// callers without external synchronization; every method takes
/// `&self`. Disk-backed stores may block on I/O.
///
/// # Object Safety
///
/// This trait is object-safe: composites own children as
/// [`DatastoreBox`].
pub trait Datastore: Send + Sync {
    /// Fetch the value stored under `key`, or `None` if absent.
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error>;

    /// Remove `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &Key) -> Result<(), Error>;

    /// Whether `key` is present.
    fn has(&self, key: &Key) -> Result<bool, Error>;

    /// Iterate entries matching `query`, ascending by key.
    fn query(&self, query: Query) -> Result<QueryResults, Error>;

    /// Release the store. Composites propagate depth-first to every
    /// owned child. Further operations after `close` are undefined.
    fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// An owned store handle. Ownership follows the construction tree:
/// a decorator owns one child, the mount router owns N.
pub type DatastoreBox = Box<dyn Datastore>;

impl std::fmt::Debug for dyn Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Datastore")
    }
}

impl<T: Datastore + ?Sized> Datastore for std::sync::Arc<T> {
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error> {
        self.as_ref().get(key)
    }

    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error> {
        self.as_ref().put(key, value)
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        self.as_ref().delete(key)
    }

    fn has(&self, key: &Key) -> Result<bool, Error> {
        self.as_ref().has(key)
    }

    fn query(&self, query: Query) -> Result<QueryResults, Error> {
        self.as_ref().query(query)
    }

    fn close(&self) -> Result<(), Error> {
        self.as_ref().close()
    }
}

impl<T: Datastore + ?Sized> Datastore for Box<T> {
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error> {
        self.as_ref().get(key)
    }

    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error> {
        self.as_ref().put(key, value)
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        self.as_ref().delete(key)
    }

    fn has(&self, key: &Key) -> Result<bool, Error> {
        self.as_ref().has(key)
    }

    fn query(&self, query: Query) -> Result<QueryResults, Error> {
        self.as_ref().query(query)
    }

    fn close(&self) -> Result<(), Error> {
        self.as_ref().close()
    }
}
