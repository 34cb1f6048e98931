//! Tests for the reference database connection

use super::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SCHEMA: &str = "
    CREATE TABLE sessions (
        id INTEGER PRIMARY KEY,
        is_archived BOOLEAN NOT NULL DEFAULT 0
    );
    CREATE TABLE messages (
        id INTEGER PRIMARY KEY,
        session_id INTEGER NOT NULL REFERENCES sessions(id),
        server_timestamp INTEGER NOT NULL,
        text TEXT
    );
    CREATE INDEX message_server_timestamp ON messages(server_timestamp);
";

fn reference_db_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let conn = RusqliteConnection::open(&path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    (dir, path)
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let err = ReferenceDatabase::open(&path).err().unwrap();

    assert!(matches!(err, AuditError::MissingInput(ref missing) if *missing == path));
    assert!(!path.exists(), "opening must not create the database");
}

#[test]
fn test_open_existing_file() {
    let (_dir, path) = reference_db_file();

    let db = ReferenceDatabase::open(&path).unwrap();

    assert_eq!(db.path(), Some(path.as_path()));
}

#[test]
fn test_connection_is_read_only() {
    let (_dir, path) = reference_db_file();
    let db = ReferenceDatabase::open(&path).unwrap();

    let result = db.conn.execute("INSERT INTO sessions (id) VALUES (1)", []);

    assert!(result.is_err());
}

#[test]
fn test_explain_unindexed_lookup_scans() {
    let (_dir, path) = reference_db_file();
    let db = ReferenceDatabase::open(&path).unwrap();

    let rows = db
        .explain("SELECT * FROM messages WHERE session_id = ?", &[0])
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows[0].detail.starts_with("SCAN"));
    assert!(rows[0].detail.contains("messages"));
}

#[test]
fn test_check_indexed_lookup_does_not_scan() {
    let (_dir, path) = reference_db_file();
    let db = ReferenceDatabase::open(&path).unwrap();

    let check = db
        .check("SELECT * FROM messages WHERE server_timestamp = ?")
        .unwrap();

    assert!(!check.has_full_scan, "{:?}", check.rows);
    assert!(check.rows[0].detail.starts_with("SEARCH"));
}

#[test]
fn test_check_binds_every_placeholder() {
    let db = ReferenceDatabase::from_schema(SCHEMA).unwrap();

    let check = db
        .check("SELECT * FROM messages WHERE session_id = ? AND server_timestamp > ? AND id IN (?, ?)")
        .unwrap();

    assert!(!check.rows.is_empty());
    assert!(db.path().is_none());
}

#[test]
fn test_check_primary_key_lookup() {
    let db = ReferenceDatabase::from_schema(SCHEMA).unwrap();

    let check = db.check("SELECT * FROM sessions WHERE id = ?").unwrap();

    assert!(!check.has_full_scan);
}

#[test]
fn test_unknown_table_is_database_error() {
    let db = ReferenceDatabase::from_schema(SCHEMA).unwrap();

    let err = db.check("SELECT * FROM reactions WHERE message_id = ?").unwrap_err();

    assert!(err.is_database());
    let message = err.to_string();
    assert!(message.contains("SELECT * FROM reactions"), "{message}");
    assert!(message.contains("no such table"), "{message}");
}

#[test]
fn test_unknown_column_is_database_error() {
    let db = ReferenceDatabase::from_schema(SCHEMA).unwrap();

    let err = db.check("SELECT expires_at FROM messages").unwrap_err();

    assert!(err.is_database());
}

#[test]
fn test_numbered_placeholders_mismatch() {
    let db = ReferenceDatabase::from_schema(SCHEMA).unwrap();

    // Two `?` characters but only one parameter slot
    let err = db
        .check("SELECT * FROM messages WHERE session_id = ?1 OR id = ?1")
        .unwrap_err();

    assert!(err.is_database());
}

#[test]
fn test_invalid_schema() {
    let err = ReferenceDatabase::from_schema("CREATE TABLE").err().unwrap();

    assert!(matches!(err, AuditError::Connection(_)));
}

#[test]
fn test_from_config_prefers_schema_script() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("schema.sql");
    std::fs::write(&schema_path, SCHEMA).unwrap();
    let config = AuditConfig::new()
        .with_database_path(dir.path().join("missing.db"))
        .with_schema_path(&schema_path);

    let db = ReferenceDatabase::from_config(&config).unwrap();

    assert!(db.path().is_none());
    assert!(db.check("SELECT * FROM messages WHERE session_id = ?").unwrap().has_full_scan);
}

#[test]
fn test_from_config_missing_schema_script() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("schema.sql");
    let config = AuditConfig::new().with_schema_path(&schema_path);

    let err = ReferenceDatabase::from_config(&config).err().unwrap();

    assert!(matches!(err, AuditError::MissingInput(ref missing) if *missing == schema_path));
}

#[test]
fn test_from_config_opens_database_file() {
    let (_dir, path) = reference_db_file();
    let config = AuditConfig::new().with_database_path(&path);

    let db = ReferenceDatabase::from_config(&config).unwrap();

    assert_eq!(db.path(), Some(path.as_path()));
}
