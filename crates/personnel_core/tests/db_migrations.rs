use personnel_core::db::migrations::latest_version;
use personnel_core::db::{open_db, open_db_in_memory, DbError};
use personnel_core::{RepoError, SqliteEmployeeRepository, StoreSession};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "employees");
    assert_index_exists(&conn, "idx_employees_manager_id");
}

#[test]
fn employees_table_has_expected_columns() {
    let conn = open_db_in_memory().unwrap();

    let mut stmt = conn.prepare("PRAGMA table_info(employees);").unwrap();
    let mut rows = stmt.query([]).unwrap();
    let mut columns = Vec::new();
    while let Some(row) = rows.next().unwrap() {
        let column_name: String = row.get(1).unwrap();
        columns.push(column_name);
    }
    for expected in [
        "id",
        "name",
        "email",
        "phone",
        "address",
        "department",
        "job_title",
        "status",
        "salary",
        "bonuses",
        "benefits",
        "date_of_joining",
        "manager_id",
    ] {
        assert!(columns.contains(&expected.to_string()), "missing {expected}");
    }
}

#[test]
fn schema_rejects_status_outside_enumerated_set() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO employees (name, status, salary, date_of_joining)
         VALUES ('Ana', 'Intern', '1.00', '2024-01-15');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("personnel.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    conn_first
        .execute(
            "INSERT INTO employees (name, salary, date_of_joining)
             VALUES ('Ana', '5000.00', '2024-01-15');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
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
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(!StoreSession::open(&path).is_available());
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let session = StoreSession::from_connection(Connection::open_in_memory().unwrap());
    let err = SqliteEmployeeRepository::try_new(&session)
        .err()
        .expect("unmigrated connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn corrupt_rows_are_reported_not_masked() {
    let session = StoreSession::open_in_memory();
    session
        .connection()
        .unwrap()
        .execute(
            "INSERT INTO employees (name, salary, date_of_joining)
             VALUES ('Ana', 'lots', '2024-01-15');",
            [],
        )
        .unwrap();

    let repo = SqliteEmployeeRepository::try_new(&session).unwrap();
    let err = personnel_core::EmployeeRepository::list_employees(&repo).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
