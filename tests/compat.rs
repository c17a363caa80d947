#![cfg(feature = "compat")]

use sqlite_utils::{compat, Row, SqliteConfig, Value};

fn row(id: i64, name: &str) -> Row {
    Row::from([
        ("id".to_string(), Value::from(id)),
        ("name".to_string(), Value::from(name)),
    ])
}

#[test]
fn sentinel_flow_matches_demo() {
    let dir = tempfile::tempdir().unwrap();
    let config = SqliteConfig::new(dir.path());
    let mut handle = compat::get_connection(&config, "share.db");
    let conn = handle.as_mut().expect("connection should open");

    assert!(!compat::check_table_exists(conn, "test_table"));
    assert!(compat::create_table(
        conn,
        "CREATE TABLE IF NOT EXISTS test_table (id INTEGER PRIMARY KEY, name TEXT)"
    ));
    assert!(compat::check_table_exists(conn, "test_table"));
    assert_eq!(compat::get_col_names(conn, "test_table"), vec!["id", "name"]);

    assert_eq!(compat::batch_insert(conn, "test_table", &[row(1, "Alice"), row(2, "Bob")]), 2);
    let rows = compat::query_all(conn, "SELECT * FROM test_table ORDER BY id").unwrap();
    assert_eq!(rows, vec![row(1, "Alice"), row(2, "Bob")]);
    assert_eq!(compat::query_all_from_table(conn, "test_table").map(|r| r.len()), Some(2));
    assert_eq!(compat::execute_count(conn, "SELECT count(*) FROM test_table"), 2);

    let data = Row::from([("name".to_string(), Value::from("Bobby"))]);
    assert_eq!(compat::update(conn, "test_table", &data, "id = 2"), 1);
    assert_eq!(
        compat::query_single_value(conn, "SELECT name FROM test_table WHERE id = 2"),
        Some(Value::from("Bobby"))
    );
    assert_eq!(
        compat::insert_or_update(conn, "INSERT INTO test_table (id, name) VALUES (3, 'Cy')"),
        1
    );
    assert_eq!(compat::delete(conn, "test_table", "id >= 2"), 2);
    assert_eq!(compat::query_single_row(conn, "SELECT * FROM test_table"), Some(row(1, "Alice")));
    assert!(compat::execute_update_sql(conn, "DELETE FROM test_table"));
    assert!(compat::execute_sql_script(conn, "DROP TABLE test_table;"));

    assert!(compat::close_connection(&mut handle));
    assert!(handle.is_none());
}

#[test]
fn failures_become_sentinels() {
    let config = SqliteConfig::default();
    let mut conn = sqlite_utils::sqlite::open_in_memory(&config).unwrap();

    assert!(!compat::check_table_exists(&conn, "missing"));
    assert_eq!(compat::query_all(&conn, "SELECT * FROM missing"), None);
    assert_eq!(compat::query_all_from_table(&conn, "missing"), None);
    assert_eq!(compat::query_single_row(&conn, "SELECT * FROM missing"), None);
    assert_eq!(compat::query_single_value(&conn, "SELECT * FROM missing"), None);
    assert_eq!(compat::execute_count(&conn, "SELECT count(*) FROM missing"), 0);
    assert!(compat::get_col_names(&conn, "missing").is_empty());
    assert!(!compat::create_table(&conn, "CREATE TABLE ("));
    assert!(!compat::execute_update_sql(&conn, "UPDATE missing SET a = 1"));
    assert_eq!(compat::insert_or_update(&mut conn, "INSERT INTO missing VALUES (1)"), 0);
    assert_eq!(compat::batch_insert(&mut conn, "missing", &[row(1, "x")]), 0);
    assert_eq!(compat::delete(&conn, "missing", "1 = 1"), 0);
    assert!(!compat::execute_sql_script(&conn, "NOT SQL;"));
}

#[test]
fn empty_query_is_some_empty_not_none() {
    let conn = sqlite_utils::sqlite::open_in_memory(&SqliteConfig::default()).unwrap();
    assert!(compat::create_table(&conn, "CREATE TABLE t (id INTEGER)"));
    assert_eq!(compat::query_all(&conn, "SELECT * FROM t"), Some(vec![]));
}

#[test]
fn closing_twice_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = compat::get_connection(&SqliteConfig::new(dir.path()), "a.db");
    assert!(compat::close_connection(&mut handle));
    assert!(!compat::close_connection(&mut handle));
}

#[test]
fn unopenable_path_yields_none() {
    let dir = tempfile::tempdir().unwrap();
    let config = SqliteConfig::new(dir.path().join("missing-dir"));
    assert!(compat::get_connection(&config, "a.db").is_none());
}

#[test]
fn oversized_busy_timeout_yields_none() {
    let dir = tempfile::tempdir().unwrap();
    let config = SqliteConfig {
        busy_timeout_ms: sqlite_utils::config::MAX_BUSY_TIMEOUT_MS + 1,
        ..SqliteConfig::new(dir.path())
    };
    assert!(compat::get_connection(&config, "a.db").is_none());
    assert!(!config.database_path("a.db").exists());
}
