//! Logging decorator: forwards everything, emits a `tracing` line per
//! operation.

use bytes::Bytes;
use tracing::debug;

use crate::error::Error;
use crate::key::Key;
use crate::query::{Query, QueryResults};
use crate::traits::{Datastore, DatastoreBox};

/// Wraps one child store and logs every operation under a configured
/// name. Arguments, results and errors pass through unchanged.
pub struct LogDatastore {
    name: String,
    child: DatastoreBox,
}

impl LogDatastore {
    pub fn new(name: impl Into<String>, child: DatastoreBox) -> Self {
        Self {
            name: name.into(),
            child,
        }
    }

    /// The configured log name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Datastore for LogDatastore {
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error> {
        debug!(store = %self.name, %key, "get");
        self.child.get(key)
    }

    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error> {
        debug!(store = %self.name, %key, len = value.len(), "put");
        self.child.put(key, value)
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        debug!(store = %self.name, %key, "delete");
        self.child.delete(key)
    }

    fn has(&self, key: &Key) -> Result<bool, Error> {
        debug!(store = %self.name, %key, "has");
        self.child.has(key)
    }

    fn query(&self, query: Query) -> Result<QueryResults, Error> {
        debug!(store = %self.name, prefix = ?query.prefix, "query");
        self.child.query(query)
    }

    fn close(&self) -> Result<(), Error> {
        debug!(store = %self.name, "close");
        self.child.close()
    }
}
