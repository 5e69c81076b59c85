//! Runtime errors shared by every store.

use crate::key::Key;

/// Errors surfaced by datastore operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No mount binding covers the key (mount router only).
    #[error("no route for key: {key}")]
    NoRoute { key: Key },

    /// Filesystem failure from a disk-backed store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a backend engine.
    #[error("{backend} error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

impl Error {
    /// Wrap an engine-reported failure, keeping the backend name for
    /// diagnosability.
    pub fn backend(backend: &'static str, error: impl std::fmt::Display) -> Self {
        Error::Backend {
            backend,
            message: error.to_string(),
        }
    }
}
