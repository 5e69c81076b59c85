//! End-to-end tests: JSON document in, live store hierarchy out.

use bytes::Bytes;
use tempfile::TempDir;

use plexstore_core::{key, Error, Query};
use plexstore_repo::{build, DatastoreSpec, SpecError};

fn build_json(document: &str, root: &TempDir) -> Result<plexstore_core::DatastoreBox, SpecError> {
    let spec = DatastoreSpec::from_json(document)?;
    build(&spec, root.path())
}

#[test]
fn two_mount_document_routes_by_prefix() {
    let root = TempDir::new().unwrap();
    let store = build_json(
        r#"{
            "type": "mount",
            "mounts": [
                {"mountpoint": "/a", "type": "mem"},
                {"mountpoint": "/b", "type": "mem"}
            ]
        }"#,
        &root,
    )
    .unwrap();

    store.put(&key!("a/k"), Bytes::from_static(b"v")).unwrap();
    assert_eq!(
        store.get(&key!("a/k")).unwrap().unwrap(),
        Bytes::from_static(b"v")
    );
    assert!(store.get(&key!("b/k")).unwrap().is_none());

    let err = store.get(&key!("c/k")).unwrap_err();
    assert!(matches!(err, Error::NoRoute { ref key } if *key == key!("c/k")));
}

#[test]
fn merged_query_is_globally_ordered() {
    let root = TempDir::new().unwrap();
    let store = build_json(
        r#"{
            "type": "mount",
            "mounts": [
                {"mountpoint": "/b", "type": "mem"},
                {"mountpoint": "/a", "type": "mem"}
            ]
        }"#,
        &root,
    )
    .unwrap();

    store.put(&key!("b/1"), Bytes::from_static(b"b1")).unwrap();
    store.put(&key!("a/2"), Bytes::from_static(b"a2")).unwrap();
    store.put(&key!("a/1"), Bytes::from_static(b"a1")).unwrap();

    let keys: Vec<String> = store
        .query(Query::all())
        .unwrap()
        .map(|r| r.unwrap().key.to_string())
        .collect();
    assert_eq!(keys, vec!["/a/1", "/a/2", "/b/1"]);

    // Offset and limit apply to the merged stream.
    let keys: Vec<String> = store
        .query(Query::all().with_offset(1).with_limit(1))
        .unwrap()
        .map(|r| r.unwrap().key.to_string())
        .collect();
    assert_eq!(keys, vec!["/a/2"]);
}

#[test]
fn full_production_shaped_document() {
    let root = TempDir::new().unwrap();
    let store = build_json(
        r#"{
            "type": "mount",
            "mounts": [
                {
                    "mountpoint": "/blocks",
                    "type": "measure",
                    "prefix": "flatfs.datastore",
                    "child": {
                        "type": "flatfs",
                        "path": "blocks",
                        "shardFunc": "/repo/flatfs/shard/v1/next-to-last/2",
                        "sync": true
                    }
                },
                {
                    "mountpoint": "/",
                    "type": "measure",
                    "prefix": "sled.datastore",
                    "child": {"type": "sled", "path": "datastore", "compression": "none"}
                }
            ]
        }"#,
        &root,
    )
    .unwrap();

    store
        .put(&key!("blocks/abcdef"), Bytes::from_static(b"block"))
        .unwrap();
    store
        .put(&key!("config"), Bytes::from_static(b"{}"))
        .unwrap();

    assert!(root.path().join("blocks/SHARDING").is_file());
    assert_eq!(
        store.get(&key!("blocks/abcdef")).unwrap().unwrap(),
        Bytes::from_static(b"block")
    );
    assert_eq!(
        store.get(&key!("config")).unwrap().unwrap(),
        Bytes::from_static(b"{}")
    );

    store.close().unwrap();
}

#[test]
fn redb_document_creates_its_directory() {
    let root = TempDir::new().unwrap();
    let store = build_json(r#"{"type": "redb", "path": "kv/nested"}"#, &root).unwrap();
    assert!(root.path().join("kv/nested/plexstore.redb").is_file());

    store.put(&key!("k"), Bytes::from_static(b"v")).unwrap();
    assert!(store.has(&key!("k")).unwrap());
}

#[test]
fn rebuilding_from_the_same_document_sees_the_same_data() {
    let root = TempDir::new().unwrap();
    let document = r#"{
        "type": "log",
        "name": "repo",
        "child": {"type": "sled", "path": "datastore"}
    }"#;

    {
        let store = build_json(document, &root).unwrap();
        store.put(&key!("k"), Bytes::from_static(b"v")).unwrap();
        store.close().unwrap();
    }

    let store = build_json(document, &root).unwrap();
    assert_eq!(
        store.get(&key!("k")).unwrap().unwrap(),
        Bytes::from_static(b"v")
    );
}

#[test]
fn malformed_documents_name_the_defect() {
    let root = TempDir::new().unwrap();

    let err = build_json(r#"{"type": "flatfs", "path": "b", "sync": true}"#, &root).unwrap_err();
    assert!(matches!(err, SpecError::MissingField { field: "shardFunc" }));

    let err = build_json(
        r#"{"type": "flatfs", "path": "b", "shardFunc": "v1/bogus/2", "sync": true}"#,
        &root,
    )
    .unwrap_err();
    assert!(matches!(err, SpecError::Shard(_)));

    let err = build_json(r#"{"type": "teleport"}"#, &root).unwrap_err();
    assert!(matches!(err, SpecError::UnknownKind(ref k) if k == "teleport"));

    // Nothing was created on disk for any of the failed builds.
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[test]
fn nested_child_error_surfaces_unchanged() {
    let root = TempDir::new().unwrap();
    let err = build_json(
        r#"{
            "type": "mount",
            "mounts": [
                {"mountpoint": "/x", "type": "log", "name": "n",
                 "child": {"type": "mem", "extra": true}},
                {"mountpoint": "/y", "type": "sled"}
            ]
        }"#,
        &root,
    )
    .unwrap_err();
    // The sled node is missing "path"; the first defect found wins.
    assert!(matches!(err, SpecError::MissingField { field: "path" }));
}
