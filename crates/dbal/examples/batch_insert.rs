//! Open a managed connection from TOML configuration and run the insert
//! helpers against an in-memory database.
//!
//! Run with: cargo run --example batch_insert

use dbal::{
    ConnectionManager, DbalResult, ManagerConfig, ParamList, Parameter, TypeRegistrations,
};

const CONFIG: &str = r#"
default_connection = "main"

[connections.main]
log_sql = true

[connections.main.driver]
driver = "sqlite"
"#;

fn main() -> DbalResult<()> {
    let config = ManagerConfig::from_toml(CONFIG)?;
    let mut manager = ConnectionManager::new(TypeRegistrations::default(), config)?;
    let conn = manager.get_connection(None)?;

    conn.execute_statement(
        "CREATE TABLE users (name TEXT NOT NULL, age INTEGER)",
        &ParamList::new(),
    )?;

    let affected = conn.insert(
        "users",
        &[
            ("name", Parameter::from("alice")),
            ("age", Parameter::from(30i64)),
        ],
    )?;
    println!("insert affected {affected} row(s)");

    let affected = conn.batch_insert(
        "users",
        &["name", "age"],
        &[
            vec![Parameter::from("bob"), Parameter::from(17i64)],
            vec![Parameter::from("carol"), Parameter::from(45i64)],
        ],
    )?;
    println!("batch insert affected {affected} row(s)");

    let filter = conn.expr().lt("age", 18i64, None)?;
    let affected = conn.execute_statement(
        &format!("DELETE FROM \"users\" WHERE {filter}"),
        filter.params(),
    )?;
    println!("delete affected {affected} row(s)");

    Ok(())
}
