//! # dbal
//!
//! A thin abstraction layer over a SQL driver: named connections and a
//! composable, parameter-tracking expression builder.
//!
//! ## Features
//!
//! - **Safe fragments**: every fragment carries exactly the parameters
//!   it emits, in placeholder order, so SQL text and bound values cannot
//!   drift apart
//! - **Two binding modes**: positional `?` or generated `:yebValueN`
//!   placeholders, fixed per builder
//! - **Composable**: AND/OR nesting and sub-fragments as comparison
//!   values, with parameter lists flattened in emission order
//! - **Narrow driver seam**: execution and quoting are consumed through
//!   the [`Driver`] and [`Platform`] traits; a rusqlite-backed SQLite
//!   driver ships in the box
//! - **Named connections**: a lazily-memoized [`ConnectionManager`]
//!   built from TOML-loadable configuration
//!
//! ## Building fragments
//!
//! ```ignore
//! use dbal::{ConnectionManager, ManagerConfig, TypeRegistrations};
//!
//! let config = ManagerConfig::from_toml(r#"
//!     [connections.default.driver]
//!     driver = "sqlite"
//! "#)?;
//! let mut manager = ConnectionManager::new(TypeRegistrations::default(), config)?;
//! let conn = manager.get_connection(None)?;
//!
//! let mut eb = conn.create_expression_builder();
//! let adults = eb.gte("age", 18, None)?;
//! let named = eb.like("name", "al%", None)?;
//! let filter = eb.and([adults, named])?;
//! // ("age" >= ?) AND ("name" LIKE ?)
//! conn.execute_statement(
//!     &format!("DELETE FROM \"users\" WHERE {filter}"),
//!     &filter.params(),
//! )?;
//! ```

pub mod connection;
pub mod driver;
pub mod error;
pub mod expr;
pub mod manager;
pub mod platform;
pub mod types;

pub use connection::{Connection, TableRef};
pub use driver::{Driver, DriverConfig, SqliteDriver};
pub use error::{DbalError, DbalResult};
pub use expr::{
    BindValue, BindingStyle, CompositeExpression, CompositeKind, Expression, ExpressionBuilder,
    Fragment, Operand, ParamEntry, ParamList, Parameter, Part, TableName,
};
pub use manager::{ConnectionManager, ConnectionParams, ManagerConfig, TypeRegistrations};
pub use platform::{Platform, SqlitePlatform};
pub use types::{BigIntTextType, BinaryType, BindType, TypeAdapter};

// Re-export the driver crate and its value enum for callers that build
// values or reach below this layer.
pub use rusqlite;
pub use rusqlite::types::Value;
