//! Metrics decorator: forwards everything, records counters and
//! latencies through the `metrics` facade.

use std::time::Instant;

use bytes::Bytes;
use metrics::{counter, histogram};

use crate::error::Error;
use crate::key::Key;
use crate::query::{Query, QueryResults};
use crate::traits::{Datastore, DatastoreBox};

/// Wraps one child store and records, per operation, a call counter
/// (`<prefix>.<op>`), an error counter (`<prefix>.<op>_errors`) and a
/// latency histogram (`<prefix>.<op>_seconds`).
///
/// Without an installed metrics recorder the macros are no-ops, so the
/// decorator costs almost nothing when unobserved.
pub struct MeasureDatastore {
    prefix: String,
    child: DatastoreBox,
}

impl MeasureDatastore {
    pub fn new(prefix: impl Into<String>, child: DatastoreBox) -> Self {
        Self {
            prefix: prefix.into(),
            child,
        }
    }

    /// The configured metric name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn record<T>(&self, op: &str, result: Result<T, Error>) -> Result<T, Error> {
        if result.is_err() {
            counter!(format!("{}.{}_errors", self.prefix, op)).increment(1);
        }
        result
    }

    fn timed<T>(&self, op: &str, f: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
        counter!(format!("{}.{}", self.prefix, op)).increment(1);
        let start = Instant::now();
        let result = f();
        histogram!(format!("{}.{}_seconds", self.prefix, op)).record(start.elapsed().as_secs_f64());
        self.record(op, result)
    }
}

impl Datastore for MeasureDatastore {
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error> {
        self.timed("get", || self.child.get(key))
    }

    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error> {
        self.timed("put", || self.child.put(key, value))
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        self.timed("delete", || self.child.delete(key))
    }

    fn has(&self, key: &Key) -> Result<bool, Error> {
        self.timed("has", || self.child.has(key))
    }

    fn query(&self, query: Query) -> Result<QueryResults, Error> {
        self.timed("query", || self.child.query(query))
    }

    fn close(&self) -> Result<(), Error> {
        self.timed("close", || self.child.close())
    }
}
