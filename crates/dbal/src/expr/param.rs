//! Bound parameter storage for built SQL fragments.

use crate::types::{BindType, DATETIME_FORMAT};
use rusqlite::types::Value;

/// A single bound value with an optional explicit bind type.
///
/// Immutable once built. Equality is by value and type, not identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    value: Value,
    ty: Option<BindType>,
}

impl Parameter {
    /// Wrap a value with no explicit bind type.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ty: None,
        }
    }

    /// Wrap a value with an explicit bind type.
    pub fn typed(value: impl Into<Value>, ty: BindType) -> Self {
        Self {
            value: value.into(),
            ty: Some(ty),
        }
    }

    /// The raw bound value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The bind type hint, if any.
    pub fn bind_type(&self) -> Option<&BindType> {
        self.ty.as_ref()
    }
}

impl From<Value> for Parameter {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Self::new(Value::Text(value.to_string()))
    }
}

impl From<String> for Parameter {
    fn from(value: String) -> Self {
        Self::new(Value::Text(value))
    }
}

impl From<i32> for Parameter {
    fn from(value: i32) -> Self {
        Self::new(Value::Integer(i64::from(value)))
    }
}

impl From<i64> for Parameter {
    fn from(value: i64) -> Self {
        Self::new(Value::Integer(value))
    }
}

impl From<f64> for Parameter {
    fn from(value: f64) -> Self {
        Self::new(Value::Real(value))
    }
}

impl From<bool> for Parameter {
    fn from(value: bool) -> Self {
        Self::new(Value::Integer(i64::from(value)))
    }
}

impl From<Vec<u8>> for Parameter {
    fn from(value: Vec<u8>) -> Self {
        Self::new(Value::Blob(value))
    }
}

impl From<chrono::NaiveDateTime> for Parameter {
    fn from(value: chrono::NaiveDateTime) -> Self {
        Self::typed(
            Value::Text(value.format(DATETIME_FORMAT).to_string()),
            BindType::DateTime,
        )
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Parameter {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        value.naive_utc().into()
    }
}

/// How a parameter list binds to SQL text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingStyle {
    /// `?` markers, bound by position.
    Positional,
    /// `:name` markers, bound by placeholder.
    Named,
}

/// One entry in a parameter collection: the parameter plus, in named
/// binding mode, the placeholder it was emitted under (leading colon
/// included).
#[derive(Clone, Debug, PartialEq)]
pub struct ParamEntry {
    pub placeholder: Option<String>,
    pub param: Parameter,
}

/// An ordered collection of bound parameters.
///
/// Positional entries align 1:1 with `?` occurrence order in the SQL
/// text; named entries carry their `:placeholder` key. Concatenation
/// preserves entry order, which is what keeps positional placeholders
/// correct when fragments compose.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    entries: Vec<ParamEntry>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional parameter and return the new length.
    pub fn push(&mut self, param: Parameter) -> usize {
        self.entries.push(ParamEntry {
            placeholder: None,
            param,
        });
        self.entries.len()
    }

    /// Append a named parameter under its placeholder.
    pub fn push_named(&mut self, placeholder: impl Into<String>, param: Parameter) {
        self.entries.push(ParamEntry {
            placeholder: Some(placeholder.into()),
            param,
        });
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append every entry of `other`, in order.
    pub fn extend(&mut self, other: &ParamList) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// The entries in placeholder order.
    pub fn entries(&self) -> &[ParamEntry] {
        &self.entries
    }

    /// Iterate over the entries in placeholder order.
    pub fn iter(&self) -> impl Iterator<Item = &ParamEntry> {
        self.entries.iter()
    }

    /// The uniform binding style of this list, or `None` when positional
    /// and named entries are mixed. An empty list counts as positional.
    pub fn binding_style(&self) -> Option<BindingStyle> {
        let named = self
            .entries
            .iter()
            .filter(|entry| entry.placeholder.is_some())
            .count();
        if named == 0 {
            Some(BindingStyle::Positional)
        } else if named == self.entries.len() {
            Some(BindingStyle::Named)
        } else {
            None
        }
    }
}

impl From<Vec<Parameter>> for ParamList {
    fn from(params: Vec<Parameter>) -> Self {
        params.into_iter().collect()
    }
}

impl FromIterator<Parameter> for ParamList {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let mut list = ParamList::new();
        for param in iter {
            list.push(param);
        }
        list
    }
}
