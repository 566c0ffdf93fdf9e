//! Connection-level tests: observable SQL via a recording driver, and
//! real execution against SQLite.

use dbal::{
    Connection, DbalResult, Driver, ParamList, Parameter, Platform, SqliteDriver, SqlitePlatform,
    TableName,
};
use std::sync::{Arc, Mutex};

/// Captures every statement handed to the driver instead of executing.
struct RecordingDriver {
    statements: Arc<Mutex<Vec<(String, usize)>>>,
}

impl Driver for RecordingDriver {
    fn platform(&self) -> Arc<dyn Platform> {
        Arc::new(SqlitePlatform)
    }

    fn execute_statement(&self, sql: &str, params: &ParamList) -> DbalResult<u64> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.len()));
        Ok(1)
    }
}

fn recording_connection() -> (Connection, Arc<Mutex<Vec<(String, usize)>>>) {
    let statements = Arc::new(Mutex::new(Vec::new()));
    let driver = RecordingDriver {
        statements: statements.clone(),
    };
    (Connection::new(Box::new(driver), false), statements)
}

fn sqlite_connection(schema: &str) -> Connection {
    let driver = SqliteDriver::open_in_memory().expect("in-memory database");
    driver.raw().execute_batch(schema).expect("schema setup");
    Connection::new(Box::new(driver), false)
}

#[test]
fn insert_builds_one_placeholder_per_value() {
    let (conn, statements) = recording_connection();
    let affected = conn
        .insert(
            "users",
            &[
                ("name", Parameter::from("alice")),
                ("age", Parameter::from(30i64)),
            ],
        )
        .unwrap();

    assert_eq!(affected, 1);
    let recorded = statements.lock().unwrap();
    assert_eq!(
        recorded.as_slice(),
        &[(
            "INSERT INTO \"users\" (\"name\",\"age\") VALUES (?,?)".to_string(),
            2
        )]
    );
}

#[test]
fn insert_accepts_a_raw_table_name_verbatim() {
    let (conn, statements) = recording_connection();
    conn.insert(
        TableName::new("\"app\".\"users\""),
        &[("name", Parameter::from("alice"))],
    )
    .unwrap();

    let recorded = statements.lock().unwrap();
    assert_eq!(
        recorded[0].0,
        "INSERT INTO \"app\".\"users\" (\"name\") VALUES (?)"
    );
}

#[test]
fn batch_insert_with_no_rows_executes_nothing() {
    let (conn, statements) = recording_connection();
    let affected = conn.batch_insert("users", &["a", "b"], &[]).unwrap();

    assert_eq!(affected, 0);
    assert!(statements.lock().unwrap().is_empty());
}

#[test]
fn batch_insert_rejects_an_empty_column_list() {
    let (conn, statements) = recording_connection();
    let err = conn
        .batch_insert("users", &[], &[vec![Parameter::from(1i64)]])
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert!(statements.lock().unwrap().is_empty());
}

#[test]
fn batch_insert_names_the_row_with_bad_arity() {
    let (conn, statements) = recording_connection();
    let err = conn
        .batch_insert(
            "users",
            &["a", "b"],
            &[
                vec![Parameter::from(1i64), Parameter::from(2i64)],
                vec![Parameter::from(3i64)],
            ],
        )
        .unwrap_err();

    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("row 1"));
    assert!(statements.lock().unwrap().is_empty());
}

#[test]
fn batch_insert_flattens_params_row_major() {
    let (conn, statements) = recording_connection();
    conn.batch_insert(
        "users",
        &["a", "b"],
        &[
            vec![Parameter::from(1i64), Parameter::from(2i64)],
            vec![Parameter::from(3i64), Parameter::from(4i64)],
        ],
    )
    .unwrap();

    let recorded = statements.lock().unwrap();
    assert_eq!(
        recorded.as_slice(),
        &[(
            "INSERT INTO \"users\" (\"a\",\"b\") VALUES (?,?),(?,?)".to_string(),
            4
        )]
    );
}

#[test]
fn insert_persists_through_a_real_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");

    {
        let driver = SqliteDriver::open(&path).unwrap();
        driver
            .raw()
            .execute_batch("CREATE TABLE users (name TEXT NOT NULL, age INTEGER)")
            .unwrap();
        let conn = Connection::new(Box::new(driver), false);
        let affected = conn
            .insert(
                "users",
                &[
                    ("name", Parameter::from("alice")),
                    ("age", Parameter::from(30i64)),
                ],
            )
            .unwrap();
        assert_eq!(affected, 1);
    }

    let check = rusqlite::Connection::open(&path).unwrap();
    let (name, age): (String, i64) = check
        .query_row("SELECT name, age FROM users", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(name, "alice");
    assert_eq!(age, 30);
}

#[test]
fn batch_insert_reports_real_affected_rows() {
    let conn = sqlite_connection("CREATE TABLE points (x INTEGER, y INTEGER)");
    let affected = conn
        .batch_insert(
            "points",
            &["x", "y"],
            &[
                vec![Parameter::from(1i64), Parameter::from(2i64)],
                vec![Parameter::from(3i64), Parameter::from(4i64)],
                vec![Parameter::from(5i64), Parameter::from(6i64)],
            ],
        )
        .unwrap();
    assert_eq!(affected, 3);
}

#[test]
fn quoting_passthrough_rejects_empty_identifiers() {
    let (conn, _) = recording_connection();
    assert_eq!(conn.quote_identifier("a.b").unwrap(), "\"a\".\"b\"");
    assert_eq!(conn.quote_single_identifier("a.b").unwrap(), "\"a.b\"");
    assert!(conn.quote_identifier("").unwrap_err().is_invalid_argument());
    assert!(
        conn.quote_single_identifier("")
            .unwrap_err()
            .is_invalid_argument()
    );
}

#[test]
fn expr_returns_the_same_cached_builder() {
    let driver = SqliteDriver::open_in_memory().unwrap();
    let mut conn = Connection::new(Box::new(driver), true);

    let first = conn.expr().create_parameter(1i64, None, None).unwrap();
    let second = conn.expr().create_parameter(2i64, None, None).unwrap();
    assert_eq!(first.to_string(), ":yebValue0");
    // The counter advanced, so the second call hit the same builder.
    assert_eq!(second.to_string(), ":yebValue1");

    // A freshly created builder starts its own counter.
    let fresh = conn
        .create_expression_builder()
        .create_parameter(3i64, None, None)
        .unwrap();
    assert_eq!(fresh.to_string(), ":yebValue0");
}

#[test]
fn built_filters_execute_end_to_end() {
    let conn = sqlite_connection(
        "CREATE TABLE users (name TEXT NOT NULL, age INTEGER);
         INSERT INTO users (name, age) VALUES ('alice', 30), ('bob', 17), ('carol', 45);",
    );

    let mut eb = conn.create_expression_builder();
    let minor = eb.lt("age", 18i64, None).unwrap();
    let named_bob = eb.eq("name", "bob", None).unwrap();
    let filter = eb.and([minor, named_bob]).unwrap();

    let affected = conn
        .execute_statement(
            &format!("DELETE FROM \"users\" WHERE {filter}"),
            &filter.params(),
        )
        .unwrap();
    assert_eq!(affected, 1);
}
