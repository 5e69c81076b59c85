//! Construction-time errors.
//!
//! Configuration errors are not transient: they propagate immediately
//! with no retry, naming the offending field so the defect can be
//! fixed without re-reading the document by hand.

use plexstore_engines::ShardError;

/// Errors from parsing a descriptor or building a store tree.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The `type` field names no known datastore kind.
    #[error("unknown datastore kind: {0}")]
    UnknownKind(String),

    /// A descriptor node is not a JSON object.
    #[error("datastore spec must be a JSON object")]
    NotAnObject,

    /// A required field is absent.
    #[error("missing field '{field}'")]
    MissingField { field: &'static str },

    /// A field is present but has the wrong shape.
    #[error("field '{field}' must be {expected}")]
    WrongFieldType {
        field: &'static str,
        expected: &'static str,
    },

    /// The flatfs shard function string failed to parse.
    #[error(transparent)]
    Shard(#[from] ShardError),

    /// A backend failed while being constructed (directory creation,
    /// engine open).
    #[error(transparent)]
    Store(#[from] plexstore_core::Error),

    /// The raw configuration document is not valid JSON.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}
