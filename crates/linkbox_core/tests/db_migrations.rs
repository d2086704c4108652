use linkbox_core::db::migrations::latest_version;
use linkbox_core::db::{open_db, open_db_in_memory, DbError};
use linkbox_core::{RecordStore, SqliteRecordStore, StoreError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "records");
}

#[test]
fn opening_same_database_twice_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linkbox.sqlite3");

    let conn_first = open_db(&path).unwrap();
    {
        let mut store = SqliteRecordStore::try_new(&conn_first).unwrap();
        store.put("Home", "{}").unwrap();
    }
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let store = SqliteRecordStore::try_new(&conn_second).unwrap();
    assert_eq!(store.get("Home").unwrap().as_deref(), Some("{}"));
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
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
fn record_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteRecordStore::try_new(&conn).err().unwrap();
    assert!(matches!(err, StoreError::MissingRequiredTable("records")));
}

#[test]
fn sqlite_put_upserts_and_keys_sort_bytewise() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteRecordStore::try_new(&conn).unwrap();
    store.put("beta", "1").unwrap();
    store.put("Alpha", "2").unwrap();
    store.put("beta", "3").unwrap();

    assert_eq!(store.keys().unwrap(), vec!["Alpha", "beta"]);
    assert_eq!(store.get("beta").unwrap().as_deref(), Some("3"));
    assert_eq!(store.get("BETA").unwrap(), None);
}

#[test]
fn records_table_holds_only_name_and_body() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn.prepare("PRAGMA table_info(records);").unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(1))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(columns, vec!["name", "body"]);

    let indexes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = 'records' AND sql IS NOT NULL;",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(indexes, 0);
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
