//! Mount router: dispatch operations to child stores by key prefix.
//!
//! The router owns an ordered list of (prefix, store) bindings fixed at
//! construction. Every keyed operation goes to the first binding whose
//! prefix covers the key, with the prefix stripped before delegation.
//! Unprefixed queries fan out to every child and merge the ordered
//! streams.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bytes::Bytes;

use crate::error::Error;
use crate::key::Key;
use crate::query::{apply_bounds, Entry, Query, QueryResults};
use crate::traits::{Datastore, DatastoreBox};

/// One (prefix, child store) binding.
pub struct Mount {
    pub prefix: Key,
    pub store: DatastoreBox,
}

/// Composite store routing by configured prefix.
///
/// Bindings are expected to partition the key space. If configured
/// prefixes overlap, the first matching binding in configured order
/// wins; this is a documented tie-break, not an error, so routing
/// stays a pure function of static configuration.
pub struct MountStore {
    mounts: Vec<Mount>,
}

impl MountStore {
    pub fn new(mounts: Vec<Mount>) -> Self {
        Self { mounts }
    }

    /// Number of bindings.
    pub fn mount_count(&self) -> usize {
        self.mounts.len()
    }

    /// First binding covering `key`, with the key stripped of the
    /// binding's prefix.
    fn lookup(&self, key: &Key) -> Option<(&Mount, Key)> {
        self.mounts.iter().find_map(|mount| {
            key.strip_prefix(&mount.prefix)
                .map(|stripped| (mount, stripped))
        })
    }

    fn route(&self, key: &Key) -> Result<(&Mount, Key), Error> {
        self.lookup(key)
            .ok_or_else(|| Error::NoRoute { key: key.clone() })
    }

    /// Children whose key range intersects the query prefix, paired
    /// with the query each child should see.
    fn query_plan(&self, prefix: Option<&Key>) -> Vec<(&Mount, Query)> {
        self.mounts
            .iter()
            .filter_map(|mount| match prefix {
                None => Some((mount, Query::all())),
                Some(p) => {
                    if let Some(stripped) = p.strip_prefix(&mount.prefix) {
                        // The binding covers the whole query range.
                        Some((mount, Query::prefixed(stripped)))
                    } else if mount.prefix.has_prefix(p) {
                        // The binding lies entirely inside the range.
                        Some((mount, Query::all()))
                    } else {
                        None
                    }
                }
            })
            .collect()
    }
}

impl Datastore for MountStore {
    fn get(&self, key: &Key) -> Result<Option<Bytes>, Error> {
        let (mount, stripped) = self.route(key)?;
        mount.store.get(&stripped)
    }

    fn put(&self, key: &Key, value: Bytes) -> Result<(), Error> {
        let (mount, stripped) = self.route(key)?;
        mount.store.put(&stripped, value)
    }

    fn delete(&self, key: &Key) -> Result<(), Error> {
        let (mount, stripped) = self.route(key)?;
        mount.store.delete(&stripped)
    }

    fn has(&self, key: &Key) -> Result<bool, Error> {
        let (mount, stripped) = self.route(key)?;
        mount.store.has(&stripped)
    }

    fn query(&self, query: Query) -> Result<QueryResults, Error> {
        let mut plan = self.query_plan(query.prefix.as_ref());

        // Single matching child: hand the whole query over, bounds
        // included, and re-prefix the stream.
        if plan.len() == 1 {
            let (mount, child_query) = plan.remove(0);
            let child_query = Query {
                offset: query.offset,
                limit: query.limit,
                ..child_query
            };
            let results = mount.store.query(child_query)?;
            return Ok(reprefix(results, mount.prefix.clone()));
        }

        // Fan out with unbounded child queries, merge the ordered
        // streams, then apply the caller's bounds.
        let mut sources = Vec::with_capacity(plan.len());
        for (mount, child_query) in plan {
            let results = mount.store.query(child_query)?;
            sources.push(reprefix(results, mount.prefix.clone()));
        }
        Ok(apply_bounds(
            Box::new(MergedResults::new(sources)),
            query.offset,
            query.limit,
        ))
    }

    fn close(&self) -> Result<(), Error> {
        // Close every child even if one fails; report the first error.
        let mut first_err = None;
        for mount in &self.mounts {
            if let Err(e) = mount.store.close() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Re-attach a mount prefix to a child's result stream.
fn reprefix(results: QueryResults, prefix: Key) -> QueryResults {
    if prefix.is_root() {
        return results;
    }
    Box::new(results.map(move |item| {
        item.map(|entry| Entry {
            key: prefix.join(&entry.key),
            value: entry.value,
        })
    }))
}

/// Head-of-stream element in the merge heap.
///
/// Ordered by (key, source index) so that, for duplicate keys across
/// overlapping bindings, the earliest-configured binding pops first.
struct Head {
    key: Key,
    value: Bytes,
    source: usize,
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.source == other.source
    }
}

impl Eq for Head {}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap and we want the smallest
        // (key, source) on top.
        (&other.key, other.source).cmp(&(&self.key, self.source))
    }
}

/// Lazy k-way merge over child streams that are already ascending.
struct MergedResults {
    sources: Vec<QueryResults>,
    heap: BinaryHeap<Head>,
    last_key: Option<Key>,
    pending_err: Option<Error>,
    failed: bool,
}

impl MergedResults {
    fn new(sources: Vec<QueryResults>) -> Self {
        let mut merged = MergedResults {
            heap: BinaryHeap::with_capacity(sources.len()),
            sources,
            last_key: None,
            pending_err: None,
            failed: false,
        };
        for source in 0..merged.sources.len() {
            merged.pull(source);
        }
        merged
    }

    /// Advance one source and push its next entry onto the heap.
    fn pull(&mut self, source: usize) {
        if self.pending_err.is_some() {
            return;
        }
        match self.sources[source].next() {
            Some(Ok(entry)) => self.heap.push(Head {
                key: entry.key,
                value: entry.value,
                source,
            }),
            Some(Err(e)) => self.pending_err = Some(e),
            None => {}
        }
    }
}

impl Iterator for MergedResults {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            // A child failure ends the merged stream immediately.
            if let Some(e) = self.pending_err.take() {
                self.failed = true;
                return Some(Err(e));
            }
            let head = self.heap.pop()?;
            self.pull(head.source);

            // Partition violation: same full key from two children.
            // The earliest-configured binding already popped first, so
            // later duplicates are dropped.
            if self.last_key.as_ref() == Some(&head.key) {
                continue;
            }
            self.last_key = Some(head.key.clone());
            return Some(Ok(Entry {
                key: head.key,
                value: head.value,
            }));
        }
    }
}
