//! Manager tests: configuration, lazy memoization, reset semantics, and
//! one-time type registration.

use dbal::{
    BinaryType, ConnectionManager, DbalError, ManagerConfig, ParamList, Parameter,
    TypeRegistrations,
};
use std::sync::Arc;

const TWO_MEMORY_CONNECTIONS: &str = r#"
default_connection = "main"

[connections.main.driver]
driver = "sqlite"

[connections.aux.driver]
driver = "sqlite"
"#;

fn manager(toml: &str) -> ConnectionManager {
    let config = ManagerConfig::from_toml(toml).expect("valid config");
    ConnectionManager::new(TypeRegistrations::default(), config).expect("manager")
}

#[test]
fn default_connection_name_falls_back_to_default() {
    let config = ManagerConfig::from_toml(
        r#"
        [connections.default.driver]
        driver = "sqlite"
        "#,
    )
    .unwrap();
    assert_eq!(config.default_connection, "default");
}

#[test]
fn config_parse_errors_are_reported() {
    let err = ManagerConfig::from_toml("default_connection = 5").unwrap_err();
    assert!(matches!(err, DbalError::Config(_)));
}

#[test]
fn unknown_connection_name_is_an_argument_error() {
    let mut manager = manager(TWO_MEMORY_CONNECTIONS);
    let err = manager.get_connection(Some("missing")).unwrap_err();
    assert!(matches!(err, DbalError::UnknownConnection(ref name) if name == "missing"));
    assert!(err.is_invalid_argument());
}

#[test]
fn connections_are_memoized_per_name() {
    let mut manager = manager(TWO_MEMORY_CONNECTIONS);

    manager
        .get_connection(None)
        .unwrap()
        .execute_statement("CREATE TABLE t (x INTEGER)", &ParamList::new())
        .unwrap();

    // Same in-memory database again, so the table is still there.
    let affected = manager
        .get_connection(Some("main"))
        .unwrap()
        .insert("t", &[("x", Parameter::from(1i64))])
        .unwrap();
    assert_eq!(affected, 1);

    // A different name opens a different database.
    let err = manager
        .get_connection(Some("aux"))
        .unwrap()
        .insert("t", &[("x", Parameter::from(1i64))])
        .unwrap_err();
    assert!(err.is_driver());
}

#[test]
fn reset_evicts_one_name() {
    let mut manager = manager(TWO_MEMORY_CONNECTIONS);

    manager
        .get_connection(Some("main"))
        .unwrap()
        .execute_statement("CREATE TABLE t (x INTEGER)", &ParamList::new())
        .unwrap();
    manager
        .get_connection(Some("aux"))
        .unwrap()
        .execute_statement("CREATE TABLE u (x INTEGER)", &ParamList::new())
        .unwrap();

    manager.reset_connection(Some("main"));

    // "main" was rebuilt from scratch: the in-memory table is gone.
    let err = manager
        .get_connection(Some("main"))
        .unwrap()
        .insert("t", &[("x", Parameter::from(1i64))])
        .unwrap_err();
    assert!(err.is_driver());

    // "aux" survived the targeted reset.
    let affected = manager
        .get_connection(Some("aux"))
        .unwrap()
        .insert("u", &[("x", Parameter::from(1i64))])
        .unwrap();
    assert_eq!(affected, 1);
}

#[test]
fn reset_without_a_name_evicts_everything() {
    let mut manager = manager(TWO_MEMORY_CONNECTIONS);

    manager
        .get_connection(Some("aux"))
        .unwrap()
        .execute_statement("CREATE TABLE u (x INTEGER)", &ParamList::new())
        .unwrap();

    manager.reset_connection(None);

    let err = manager
        .get_connection(Some("aux"))
        .unwrap()
        .insert("u", &[("x", Parameter::from(1i64))])
        .unwrap_err();
    assert!(err.is_driver());
}

#[test]
fn named_parameter_mode_flows_from_configuration() {
    let mut manager = manager(
        r#"
        default_connection = "main"

        [connections.main]
        use_named_parameters = true

        [connections.main.driver]
        driver = "sqlite"
        "#,
    );

    let conn = manager.get_connection(None).unwrap();
    conn.execute_statement(
        "CREATE TABLE users (name TEXT, age INTEGER)",
        &ParamList::new(),
    )
    .unwrap();
    conn.insert(
        "users",
        &[
            ("name", Parameter::from("alice")),
            ("age", Parameter::from(30i64)),
        ],
    )
    .unwrap();

    let filter = conn.expr().gte("age", 18i64, None).unwrap();
    assert_eq!(filter.to_string(), "\"age\" >= :yebValue0");

    let affected = conn
        .execute_statement(
            &format!("DELETE FROM \"users\" WHERE {filter}"),
            filter.params(),
        )
        .unwrap();
    assert_eq!(affected, 1);
}

#[test]
fn type_registration_happens_at_most_once_per_process() {
    let registrations = TypeRegistrations {
        add: vec![("probe_blob".to_string(), Arc::new(BinaryType) as _)],
        overrides: Vec::new(),
    };
    let config = ManagerConfig::from_toml(TWO_MEMORY_CONNECTIONS).unwrap();

    // A duplicate registration would fail if it ran twice; the second
    // manager must skip the already-applied load.
    ConnectionManager::new(registrations.clone(), config.clone()).unwrap();
    ConnectionManager::new(registrations, config).unwrap();
}
