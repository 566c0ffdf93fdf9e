//! SQLite driver backed by rusqlite.
//!
//! SQLite natively binds both placeholder styles this layer emits,
//! positional `?` and named `:name`, so statements execute without any
//! text rewriting.

use crate::driver::Driver;
use crate::error::{DbalError, DbalResult};
use crate::expr::{BindingStyle, ParamList, Parameter};
use crate::platform::{Platform, SqlitePlatform};
use crate::types;
use rusqlite::ToSql;
use rusqlite::types::Value;
use std::path::Path;
use std::sync::Arc;

/// One open SQLite database handle.
pub struct SqliteDriver {
    conn: rusqlite::Connection,
    platform: Arc<SqlitePlatform>,
}

impl SqliteDriver {
    /// Open a database file, creating it if missing.
    pub fn open(path: impl AsRef<Path>) -> DbalResult<Self> {
        Ok(Self::with_connection(rusqlite::Connection::open(path)?))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> DbalResult<Self> {
        Ok(Self::with_connection(
            rusqlite::Connection::open_in_memory()?,
        ))
    }

    /// Wrap an already-open rusqlite handle.
    pub fn with_connection(conn: rusqlite::Connection) -> Self {
        Self {
            conn,
            platform: Arc::new(SqlitePlatform),
        }
    }

    /// Direct access to the underlying rusqlite handle, for schema setup
    /// and anything else outside this layer's scope.
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

impl Driver for SqliteDriver {
    fn platform(&self) -> Arc<dyn Platform> {
        self.platform.clone()
    }

    fn execute_statement(&self, sql: &str, params: &ParamList) -> DbalResult<u64> {
        let style = params.binding_style().ok_or_else(|| {
            DbalError::logic("A statement cannot mix positional and named parameters")
        })?;

        let mut stmt = self.conn.prepare(sql)?;
        let affected = match style {
            BindingStyle::Positional => {
                let values = params
                    .iter()
                    .map(|entry| bound_value(&entry.param))
                    .collect::<DbalResult<Vec<Value>>>()?;
                stmt.execute(rusqlite::params_from_iter(values))?
            }
            BindingStyle::Named => {
                let pairs = params
                    .iter()
                    .map(|entry| {
                        let placeholder = entry
                            .placeholder
                            .clone()
                            .expect("named style implies a placeholder on every entry");
                        Ok((placeholder, bound_value(&entry.param)?))
                    })
                    .collect::<DbalResult<Vec<(String, Value)>>>()?;
                let refs: Vec<(&str, &dyn ToSql)> = pairs
                    .iter()
                    .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
                    .collect();
                stmt.execute(refs.as_slice())?
            }
        };
        Ok(affected as u64)
    }
}

/// Apply the parameter's bind-type coercion, if it carries one.
fn bound_value(param: &Parameter) -> DbalResult<Value> {
    match param.bind_type() {
        Some(ty) => types::to_database_value(param.value().clone(), ty),
        None => Ok(param.value().clone()),
    }
}
