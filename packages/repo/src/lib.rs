//! Configuration-driven construction of plexstore hierarchies.
//!
//! A repository's storage layout is described by a nested JSON
//! document. This crate parses that document into a typed
//! [`DatastoreSpec`] tree and [`build`]s the live store it describes,
//! with relative on-disk paths resolved against a repository root:
//!
//! ```no_run
//! use plexstore_repo::{build, DatastoreSpec};
//!
//! # fn main() -> Result<(), plexstore_repo::SpecError> {
//! let spec = DatastoreSpec::from_json(
//!     r#"{"type": "mount", "mounts": [
//!         {"mountpoint": "/", "type": "sled", "path": "datastore"}
//!     ]}"#,
//! )?;
//! let store = build(&spec, std::path::Path::new("/var/lib/myrepo"))?;
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod spec;

pub use builder::build;
pub use error::SpecError;
pub use spec::{DatastoreSpec, MountSpec};
