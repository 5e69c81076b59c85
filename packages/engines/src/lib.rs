//! Leaf storage engines for plexstore.
//!
//! Every engine here implements the `plexstore-core` [`Datastore`]
//! contract and nothing else; composition (mounting, decoration) and
//! configuration-driven construction live in the other crates.
//!
//! [`Datastore`]: plexstore_core::Datastore

pub mod flatfs;
pub mod mem;
pub mod redb_store;
pub mod shard;
pub mod sled_store;

pub use flatfs::FlatfsDatastore;
pub use mem::MemDatastore;
pub use redb_store::RedbDatastore;
pub use shard::{ShardError, ShardFunc};
pub use sled_store::{Compression, SledDatastore};
