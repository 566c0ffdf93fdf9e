//! Bind types and the process-wide custom type registry.
//!
//! A [`BindType`] tag travels with a bound parameter and tells the driver
//! how to coerce the value before binding it. The non-custom tags are
//! handled by [`to_database_value`] directly; [`BindType::Custom`] names
//! an adapter installed in the registry via [`add_type`] /
//! [`override_type`].

use crate::error::{DbalError, DbalResult};
use chrono::{DateTime, NaiveDateTime};
use once_cell::sync::Lazy;
use rusqlite::types::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Canonical text layout for datetime values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Type tag attached to a bound parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindType {
    Integer,
    BigInt,
    Float,
    Text,
    Boolean,
    Binary,
    DateTime,
    /// A custom type registered under this name.
    Custom(String),
}

/// Conversion applied to a tagged value before it reaches the driver.
pub trait TypeAdapter: Send + Sync {
    /// Coerce a value into its database representation.
    fn to_database_value(&self, value: Value) -> DbalResult<Value>;
}

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<dyn TypeAdapter>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a new custom type adapter. Fails if the name is taken.
pub fn add_type(name: impl Into<String>, adapter: Arc<dyn TypeAdapter>) -> DbalResult<()> {
    let name = name.into();
    let mut registry = REGISTRY.write().expect("type registry lock poisoned");
    if registry.contains_key(&name) {
        return Err(DbalError::logic(format!(
            "Type \"{name}\" is already registered"
        )));
    }
    registry.insert(name, adapter);
    Ok(())
}

/// Replace an existing custom type adapter. Fails if the name is unknown.
pub fn override_type(name: impl Into<String>, adapter: Arc<dyn TypeAdapter>) -> DbalResult<()> {
    let name = name.into();
    let mut registry = REGISTRY.write().expect("type registry lock poisoned");
    if !registry.contains_key(&name) {
        return Err(DbalError::UnknownType(name));
    }
    registry.insert(name, adapter);
    Ok(())
}

fn lookup(name: &str) -> Option<Arc<dyn TypeAdapter>> {
    REGISTRY
        .read()
        .expect("type registry lock poisoned")
        .get(name)
        .cloned()
}

/// Coerce a value according to its bind type tag.
///
/// `Null` passes through every non-custom coercion unchanged.
pub fn to_database_value(value: Value, ty: &BindType) -> DbalResult<Value> {
    match ty {
        BindType::Integer | BindType::BigInt => coerce_integer(value),
        BindType::Float => coerce_float(value),
        BindType::Text => coerce_text(value),
        BindType::Boolean => coerce_boolean(value),
        BindType::Binary => coerce_binary(value),
        BindType::DateTime => coerce_datetime(value),
        BindType::Custom(name) => lookup(name)
            .ok_or_else(|| DbalError::UnknownType(name.clone()))?
            .to_database_value(value),
    }
}

fn coerce_integer(value: Value) -> DbalResult<Value> {
    match value {
        Value::Null | Value::Integer(_) => Ok(value),
        Value::Text(text) => text
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| cannot_bind(&Value::Text(text), "INTEGER")),
        other => Err(cannot_bind(&other, "INTEGER")),
    }
}

fn coerce_float(value: Value) -> DbalResult<Value> {
    match value {
        Value::Null | Value::Real(_) => Ok(value),
        Value::Integer(int) => Ok(Value::Real(int as f64)),
        Value::Text(text) => text
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| cannot_bind(&Value::Text(text), "FLOAT")),
        other => Err(cannot_bind(&other, "FLOAT")),
    }
}

fn coerce_text(value: Value) -> DbalResult<Value> {
    match value {
        Value::Null | Value::Text(_) => Ok(value),
        Value::Integer(int) => Ok(Value::Text(int.to_string())),
        Value::Real(real) => Ok(Value::Text(real.to_string())),
        other => Err(cannot_bind(&other, "TEXT")),
    }
}

fn coerce_boolean(value: Value) -> DbalResult<Value> {
    match value {
        Value::Null => Ok(value),
        Value::Integer(int) => Ok(Value::Integer(i64::from(int != 0))),
        Value::Text(text) => match text.as_str() {
            "true" | "1" => Ok(Value::Integer(1)),
            "false" | "0" => Ok(Value::Integer(0)),
            _ => Err(cannot_bind(&Value::Text(text), "BOOLEAN")),
        },
        other => Err(cannot_bind(&other, "BOOLEAN")),
    }
}

fn coerce_binary(value: Value) -> DbalResult<Value> {
    match value {
        Value::Null | Value::Blob(_) => Ok(value),
        Value::Text(text) => Ok(Value::Blob(text.into_bytes())),
        other => Err(cannot_bind(&other, "BINARY")),
    }
}

fn coerce_datetime(value: Value) -> DbalResult<Value> {
    match value {
        Value::Null => Ok(value),
        Value::Text(text) => {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(&text, DATETIME_FORMAT) {
                return Ok(Value::Text(parsed.format(DATETIME_FORMAT).to_string()));
            }
            DateTime::parse_from_rfc3339(&text)
                .map(|parsed| Value::Text(parsed.naive_utc().format(DATETIME_FORMAT).to_string()))
                .map_err(|_| cannot_bind(&Value::Text(text), "DATETIME"))
        }
        other => Err(cannot_bind(&other, "DATETIME")),
    }
}

fn cannot_bind(value: &Value, ty: &str) -> DbalError {
    DbalError::invalid_argument(format!("Cannot bind {value:?} as {ty}"))
}

/// Stores 64-bit integers as text.
///
/// For callers that round-trip big integers through storage with lossy
/// integer affinity, or that compare them as strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct BigIntTextType;

impl TypeAdapter for BigIntTextType {
    fn to_database_value(&self, value: Value) -> DbalResult<Value> {
        match value {
            Value::Null => Ok(value),
            Value::Integer(int) => Ok(Value::Text(int.to_string())),
            Value::Text(text) => text
                .parse::<i64>()
                .map(|int| Value::Text(int.to_string()))
                .map_err(|_| cannot_bind(&Value::Text(text), "BIGINT")),
            other => Err(cannot_bind(&other, "BIGINT")),
        }
    }
}

/// Maps text or blob input to a BLOB column value.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryType;

impl TypeAdapter for BinaryType {
    fn to_database_value(&self, value: Value) -> DbalResult<Value> {
        coerce_binary(value)
    }
}
