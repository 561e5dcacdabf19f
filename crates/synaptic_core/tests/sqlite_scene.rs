use rusqlite::Connection;
use serde_json::json;
use synaptic_core::db::migrations::latest_version;
use synaptic_core::db::{open_db, open_db_in_memory};
use synaptic_core::{MetaError, MetadataAccessor, NodeId, NodeStore, SqliteNodeStore, StoreError};

fn node(name: &str) -> NodeId {
    NodeId::new(name).unwrap()
}

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "nodes");
    assert_table_exists(&conn, "node_attributes");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "node_attributes");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        StoreError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteNodeStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        StoreError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn store_tracks_nodes_and_attributes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNodeStore::try_new(&conn).unwrap();
    let a = node("A");

    store.create_node(&a).unwrap();
    store.create_referenced_node(&node("ref:B")).unwrap();
    assert!(matches!(
        store.create_node(&a),
        Err(StoreError::DuplicateNode(_))
    ));

    assert!(store.node_exists(&a).unwrap());
    assert!(!store.is_referenced(&a).unwrap());
    assert!(store.is_referenced(&node("ref:B")).unwrap());
    assert_eq!(store.node_ids().unwrap(), vec![a.clone(), node("ref:B")]);

    assert_eq!(store.read_attribute(&a).unwrap(), None);
    store.write_attribute(&a, "{\"v\":1}").unwrap();
    store.write_attribute(&a, "{\"v\":2}").unwrap();
    assert_eq!(
        store.read_attribute(&a).unwrap().as_deref(),
        Some("{\"v\":2}")
    );

    assert!(matches!(
        store.write_attribute(&node("ghost"), "{}"),
        Err(StoreError::NodeNotFound(_))
    ));
}

#[test]
fn deleting_node_cascades_to_attribute() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNodeStore::try_new(&conn).unwrap();
    let a = node("A");
    store.create_node(&a).unwrap();
    store.write_attribute(&a, "{}").unwrap();

    store.delete_node(&a).unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM node_attributes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
    assert!(matches!(
        store.delete_node(&a),
        Err(StoreError::NodeNotFound(_))
    ));
}

#[test]
fn metadata_survives_reopening_scene_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.db");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteNodeStore::try_new(&conn).unwrap();
        store.create_node(&node("A")).unwrap();
        store.create_node(&node("B")).unwrap();

        let accessor = MetadataAccessor::new(store);
        let meta = accessor.get(&node("A")).unwrap();
        meta.set("foobar", &123).unwrap();
        meta.tag("rainbow", &node("B")).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let accessor = MetadataAccessor::new(SqliteNodeStore::try_new(&conn).unwrap());
    let meta = accessor.existing(&node("A")).unwrap().unwrap();
    assert_eq!(meta.get("foobar").unwrap(), Some(json!(123)));
    assert_eq!(meta.find_first("rainbow").unwrap(), Some(node("B")));
    assert!(!accessor.has_meta(&node("B")).unwrap());
}

#[test]
fn accessor_reports_missing_sqlite_nodes() {
    let conn = open_db_in_memory().unwrap();
    let accessor = MetadataAccessor::new(SqliteNodeStore::try_new(&conn).unwrap());

    let err = accessor.get(&node("nowhere")).err().unwrap();
    assert!(matches!(err, MetaError::NodeNotFound(_)));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
