//! The execution capability consumed by [`Connection`](crate::Connection).
//!
//! The core hands a driver finished SQL text plus a [`ParamList`]; the
//! parameter list carries the bind-type hints. That pairing is the whole
//! wire contract. Everything else a real database client does (pooling,
//! transactions, result decoding) stays on the driver's side of the
//! trait.

mod sqlite;

pub use sqlite::SqliteDriver;

use crate::error::DbalResult;
use crate::expr::ParamList;
use crate::platform::Platform;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Narrow execution interface between this layer and a database driver.
pub trait Driver: Send {
    /// The identifier-quoting rules of the driver's dialect.
    fn platform(&self) -> Arc<dyn Platform>;

    /// Execute one statement and report the affected-row count.
    ///
    /// Driver failures propagate verbatim; nothing is retried here.
    fn execute_statement(&self, sql: &str, params: &ParamList) -> DbalResult<u64>;
}

/// Driver selection and settings for one connection.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum DriverConfig {
    Sqlite {
        /// Database file path; omit for an in-memory database.
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

/// Open a driver connection from its configuration block.
pub fn connect(config: &DriverConfig) -> DbalResult<Box<dyn Driver>> {
    match config {
        DriverConfig::Sqlite { path } => {
            let driver = match path {
                Some(path) => SqliteDriver::open(path)?,
                None => SqliteDriver::open_in_memory()?,
            };
            Ok(Box::new(driver))
        }
    }
}
