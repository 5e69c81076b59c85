//! Query model: prefix-restricted, ordered iteration over entries.

use bytes::Bytes;

use crate::error::Error;
use crate::key::Key;

/// One key-value pair produced by a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,
    pub value: Bytes,
}

/// A query over a store.
///
/// Results are always ordered ascending by key. The prefix restriction
/// matches the prefix key itself and all of its descendants, using
/// whole-segment comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub prefix: Option<Key>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Query {
    /// A query with no restriction: everything, in key order.
    pub fn all() -> Self {
        Query::default()
    }

    /// Restrict to a key prefix.
    pub fn prefixed(prefix: Key) -> Self {
        Query {
            prefix: Some(prefix),
            ..Query::default()
        }
    }

    /// Skip the first `offset` matching entries.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Cap the number of entries returned.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a key satisfies the prefix restriction.
    pub fn matches(&self, key: &Key) -> bool {
        match &self.prefix {
            Some(prefix) => key.has_prefix(prefix),
            None => true,
        }
    }
}

/// The ordered result stream of a query.
///
/// Leaf engines may materialize a snapshot behind this; the mount
/// router merges child streams lazily.
pub type QueryResults = Box<dyn Iterator<Item = Result<Entry, Error>> + Send>;

/// Build results from a materialized snapshot: filter by the query
/// prefix, sort ascending by key, then apply offset/limit.
///
/// This is the shared tail of every snapshot-based engine's `query`.
pub fn results_from_entries(query: &Query, mut entries: Vec<Entry>) -> QueryResults {
    entries.retain(|e| query.matches(&e.key));
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    apply_bounds(
        Box::new(entries.into_iter().map(Ok)),
        query.offset,
        query.limit,
    )
}

/// Apply offset/limit to a result stream.
///
/// Bounds count successful entries only; an error item passes through
/// untouched so the caller still sees it.
pub fn apply_bounds(results: QueryResults, offset: usize, limit: Option<usize>) -> QueryResults {
    if offset == 0 && limit.is_none() {
        return results;
    }
    Box::new(Bounded {
        inner: results,
        to_skip: offset,
        remaining: limit,
    })
}

struct Bounded {
    inner: QueryResults,
    to_skip: usize,
    remaining: Option<usize>,
}

impl Iterator for Bounded {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if self.to_skip > 0 {
                        self.to_skip -= 1;
                        continue;
                    }
                    if let Some(remaining) = &mut self.remaining {
                        *remaining -= 1;
                    }
                    return Some(Ok(entry));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
