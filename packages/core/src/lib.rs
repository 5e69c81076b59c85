//! plexstore core: one key-value contract, many stores.
//!
//! This crate defines the pieces every plexstore backend shares: the
//! hierarchical [`Key`], the [`Query`] model, the [`Datastore`] trait,
//! and the backend-agnostic composite stores: the prefix-routing
//! [`MountStore`] and the logging/metrics decorators.
//! Leaf engines live in `plexstore-engines`; configuration-driven
//! assembly lives in `plexstore-repo`.

pub mod error;
pub mod key;
pub mod log;
pub mod measure;
pub mod mount;
pub mod query;
pub mod traits;

pub use error::Error;
pub use key::Key;
pub use log::LogDatastore;
pub use measure::MeasureDatastore;
pub use mount::{Mount, MountStore};
pub use query::{apply_bounds, results_from_entries, Entry, Query, QueryResults};
pub use traits::{Datastore, DatastoreBox};

pub use bytes::Bytes;
