//! Typed store descriptors parsed from a configuration document.
//!
//! The document is a nested JSON mapping with a `type` tag per node,
//! e.g.:
//!
//! ```json
//! {
//!   "type": "mount",
//!   "mounts": [
//!     {"mountpoint": "/blocks", "type": "flatfs",
//!      "path": "blocks", "shardFunc": "v1/next-to-last/2", "sync": true},
//!     {"mountpoint": "/", "type": "sled", "path": "datastore"}
//!   ]
//! }
//! ```
//!
//! Parsing validates the whole tree into this closed union before any
//! store is constructed, so a malformed descriptor can never leave a
//! half-built hierarchy behind.

use serde_json::{Map, Value};

use plexstore_core::Key;
use plexstore_engines::{Compression, ShardFunc};

use crate::error::SpecError;

/// One node of the validated configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DatastoreSpec {
    /// Prefix router over child stores.
    Mount { mounts: Vec<MountSpec> },
    /// Sharded flat-file engine.
    Flatfs {
        path: String,
        shard: ShardFunc,
        sync: bool,
    },
    /// In-memory engine.
    Mem,
    /// Logging decorator.
    Log {
        name: String,
        child: Box<DatastoreSpec>,
    },
    /// Metrics decorator.
    Measure {
        prefix: String,
        child: Box<DatastoreSpec>,
    },
    /// sled engine.
    Sled {
        path: String,
        compression: Compression,
    },
    /// redb engine; its directory is created if absent.
    Redb { path: String },
}

/// A child descriptor plus the prefix it is mounted under.
#[derive(Debug, Clone, PartialEq)]
pub struct MountSpec {
    pub mountpoint: Key,
    pub spec: DatastoreSpec,
}

impl DatastoreSpec {
    /// Parse and validate a descriptor node.
    pub fn from_value(value: &Value) -> Result<Self, SpecError> {
        let map = value.as_object().ok_or(SpecError::NotAnObject)?;
        Self::from_map(map)
    }

    /// Parse a raw JSON document into a descriptor tree.
    pub fn from_json(document: &str) -> Result<Self, SpecError> {
        let value: Value = serde_json::from_str(document)?;
        Self::from_value(&value)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, SpecError> {
        match require_str(map, "type")? {
            "mount" => {
                let mounts = require_array(map, "mounts")?
                    .iter()
                    .map(MountSpec::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DatastoreSpec::Mount { mounts })
            }
            "flatfs" => Ok(DatastoreSpec::Flatfs {
                path: require_str(map, "path")?.to_string(),
                shard: ShardFunc::parse(require_str(map, "shardFunc")?)?,
                sync: require_bool(map, "sync")?,
            }),
            "mem" => Ok(DatastoreSpec::Mem),
            "log" => Ok(DatastoreSpec::Log {
                name: require_str(map, "name")?.to_string(),
                child: Box::new(Self::from_value(require(map, "child")?)?),
            }),
            "measure" => Ok(DatastoreSpec::Measure {
                prefix: require_str(map, "prefix")?.to_string(),
                child: Box::new(Self::from_value(require(map, "child")?)?),
            }),
            "sled" => Ok(DatastoreSpec::Sled {
                path: require_str(map, "path")?.to_string(),
                compression: optional_compression(map)?,
            }),
            "redb" => Ok(DatastoreSpec::Redb {
                path: require_str(map, "path")?.to_string(),
            }),
            other => Err(SpecError::UnknownKind(other.to_string())),
        }
    }
}

impl MountSpec {
    fn from_value(value: &Value) -> Result<Self, SpecError> {
        let map = value.as_object().ok_or(SpecError::NotAnObject)?;
        let mountpoint = Key::new(require_str(map, "mountpoint")?);
        let spec = DatastoreSpec::from_map(map)?;
        Ok(MountSpec { mountpoint, spec })
    }
}

fn require<'a>(map: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, SpecError> {
    map.get(field).ok_or(SpecError::MissingField { field })
}

fn require_str<'a>(map: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, SpecError> {
    require(map, field)?
        .as_str()
        .ok_or(SpecError::WrongFieldType {
            field,
            expected: "a string",
        })
}

fn require_bool(map: &Map<String, Value>, field: &'static str) -> Result<bool, SpecError> {
    require(map, field)?
        .as_bool()
        .ok_or(SpecError::WrongFieldType {
            field,
            expected: "a boolean",
        })
}

fn require_array<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Vec<Value>, SpecError> {
    require(map, field)?
        .as_array()
        .ok_or(SpecError::WrongFieldType {
            field,
            expected: "an array",
        })
}

/// The `compression` field defaults to the engine's named default
/// when absent or empty. Unrecognized modes are rejected rather than
/// silently falling back.
fn optional_compression(map: &Map<String, Value>) -> Result<Compression, SpecError> {
    let field = "compression";
    let expected = r#"one of "none", "snappy" or """#;
    match map.get(field) {
        None => Ok(Compression::Default),
        Some(value) => match value.as_str() {
            Some("") => Ok(Compression::Default),
            Some("none") => Ok(Compression::None),
            Some("snappy") => Ok(Compression::Snappy),
            _ => Err(SpecError::WrongFieldType { field, expected }),
        },
    }
}
