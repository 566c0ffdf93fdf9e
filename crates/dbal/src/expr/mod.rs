//! SQL fragment construction with exact parameter tracking.
//!
//! The builder turns columns, operators, and values into immutable
//! fragments that carry their own parameter lists, so the SQL text and
//! the bound values can never drift apart:
//!
//! ```ignore
//! use dbal::{ExpressionBuilder, SqlitePlatform};
//! use std::sync::Arc;
//!
//! let mut eb = ExpressionBuilder::new(Arc::new(SqlitePlatform), false);
//! let adults = eb.gte("age", 18, None)?;
//! let active = eb.eq("status", "active", None)?;
//! let filter = eb.and([adults, active])?;
//! // ("age" >= ?) AND ("status" = ?), params [18, "active"]
//! ```

mod builder;
mod expression;
mod param;

pub use builder::{BindValue, ExpressionBuilder, Operand};
pub use expression::{CompositeExpression, CompositeKind, Expression, Fragment, Part, TableName};
pub use param::{BindingStyle, ParamEntry, ParamList, Parameter};
