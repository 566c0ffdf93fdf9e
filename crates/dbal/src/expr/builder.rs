//! The expression builder: columns, operators, and values in; quoted,
//! parameterized SQL fragments out.
//!
//! A builder is constructed per statement with a fixed binding mode:
//! positional (`?`) or named (`:yebValueN`). Named placeholders are
//! numbered by a builder-scoped counter that starts at 0 and is never
//! reset or reused, so every fragment built by one builder binds under a
//! distinct name. Methods that may generate placeholders take `&mut
//! self`; share a builder across statements and the counter keeps
//! climbing, which is harmless but usually means you wanted a fresh one.

use crate::error::{DbalError, DbalResult};
use crate::expr::expression::{CompositeExpression, Expression, Fragment, Part, TableName};
use crate::expr::param::{ParamList, Parameter};
use crate::platform::Platform;
use crate::types::BindType;
use rusqlite::types::Value;
use std::sync::Arc;

/// A value position in a predicate: a plain value, a pre-typed
/// [`Parameter`], or a sub-fragment spliced in with its own parameters.
#[derive(Clone, Debug)]
pub enum BindValue {
    Value(Value),
    Param(Parameter),
    Fragment(Fragment),
}

impl BindValue {
    /// Loose emptiness used by the IN-list filter. Fragments are never
    /// empty here; they are rejected later with a more specific error.
    fn is_empty_value(&self) -> bool {
        let value = match self {
            BindValue::Value(value) => value,
            BindValue::Param(param) => param.value(),
            BindValue::Fragment(_) => return false,
        };
        match value {
            Value::Null => true,
            Value::Integer(int) => *int == 0,
            Value::Real(real) => *real == 0.0,
            Value::Text(text) => text.is_empty() || text == "0",
            Value::Blob(blob) => blob.is_empty(),
        }
    }
}

impl PartialEq for BindValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BindValue::Value(a), BindValue::Value(b)) => a == b,
            (BindValue::Param(a), BindValue::Param(b)) => a == b,
            // Fragments never compare equal; each stands for its own SQL.
            _ => false,
        }
    }
}

impl From<Value> for BindValue {
    fn from(value: Value) -> Self {
        BindValue::Value(value)
    }
}

impl From<Parameter> for BindValue {
    fn from(param: Parameter) -> Self {
        BindValue::Param(param)
    }
}

impl From<Fragment> for BindValue {
    fn from(fragment: Fragment) -> Self {
        BindValue::Fragment(fragment)
    }
}

impl From<Expression> for BindValue {
    fn from(expression: Expression) -> Self {
        BindValue::Fragment(expression.into())
    }
}

impl From<CompositeExpression> for BindValue {
    fn from(composite: CompositeExpression) -> Self {
        BindValue::Fragment(composite.into())
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        BindValue::Value(Value::Text(value.to_string()))
    }
}

impl From<String> for BindValue {
    fn from(value: String) -> Self {
        BindValue::Value(Value::Text(value))
    }
}

impl From<i32> for BindValue {
    fn from(value: i32) -> Self {
        BindValue::Value(Value::Integer(i64::from(value)))
    }
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        BindValue::Value(Value::Integer(value))
    }
}

impl From<f64> for BindValue {
    fn from(value: f64) -> Self {
        BindValue::Value(Value::Real(value))
    }
}

impl From<bool> for BindValue {
    fn from(value: bool) -> Self {
        BindValue::Value(Value::Integer(i64::from(value)))
    }
}

impl From<Vec<u8>> for BindValue {
    fn from(value: Vec<u8>) -> Self {
        BindValue::Value(Value::Blob(value))
    }
}

impl From<chrono::NaiveDateTime> for BindValue {
    fn from(value: chrono::NaiveDateTime) -> Self {
        BindValue::Param(value.into())
    }
}

impl From<chrono::DateTime<chrono::Utc>> for BindValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        BindValue::Param(value.into())
    }
}

/// Subject of predicates that accept either a column name or a fragment.
#[derive(Clone, Debug)]
pub enum Operand {
    Column(String),
    Fragment(Fragment),
}

impl From<&str> for Operand {
    fn from(column: &str) -> Self {
        Operand::Column(column.to_string())
    }
}

impl From<String> for Operand {
    fn from(column: String) -> Self {
        Operand::Column(column)
    }
}

impl From<Fragment> for Operand {
    fn from(fragment: Fragment) -> Self {
        Operand::Fragment(fragment)
    }
}

impl From<Expression> for Operand {
    fn from(expression: Expression) -> Self {
        Operand::Fragment(expression.into())
    }
}

impl From<CompositeExpression> for Operand {
    fn from(composite: CompositeExpression) -> Self {
        Operand::Fragment(composite.into())
    }
}

/// Per-statement factory for parameterized SQL fragments.
pub struct ExpressionBuilder {
    platform: Arc<dyn Platform>,
    use_named_parameters: bool,
    bound_counter: usize,
}

impl ExpressionBuilder {
    pub const EQ: &'static str = "=";
    pub const NEQ: &'static str = "<>";
    pub const LT: &'static str = "<";
    pub const LTE: &'static str = "<=";
    pub const GT: &'static str = ">";
    pub const GTE: &'static str = ">=";

    /// Create a builder bound to a quoting platform and a binding mode.
    pub fn new(platform: Arc<dyn Platform>, use_named_parameters: bool) -> Self {
        Self {
            platform,
            use_named_parameters,
            bound_counter: 0,
        }
    }

    /// Whether this builder emits named placeholders.
    pub fn use_named_parameters(&self) -> bool {
        self.use_named_parameters
    }

    /// Bind a single value, producing the placeholder fragment for it.
    ///
    /// The value is wrapped in a [`Parameter`] carrying `ty` unless `ty`
    /// is omitted or the value already is a parameter (an explicit
    /// parameter keeps its own type). In named mode a caller-supplied
    /// `placeholder` is normalized to exactly one leading colon;
    /// otherwise a `:yebValueN` placeholder is generated.
    ///
    /// Fragments cannot be bound as scalar parameters; passing one is a
    /// logic error.
    pub fn create_parameter(
        &mut self,
        value: impl Into<BindValue>,
        ty: Option<BindType>,
        placeholder: Option<&str>,
    ) -> DbalResult<Expression> {
        let param = match value.into() {
            BindValue::Fragment(_) => {
                return Err(DbalError::logic(
                    "A SQL fragment cannot be bound as a scalar parameter",
                ));
            }
            BindValue::Param(param) => param,
            BindValue::Value(value) => match ty {
                Some(ty) => Parameter::typed(value, ty),
                None => Parameter::new(value),
            },
        };

        if self.use_named_parameters {
            let placeholder = match placeholder {
                Some(name) => format!(":{}", name.trim_start_matches(':')),
                None => self.next_placeholder(),
            };
            let mut params = ParamList::new();
            params.push_named(placeholder.clone(), param);
            return Ok(Expression::new(placeholder, params));
        }

        let mut params = ParamList::new();
        params.push(param);
        Ok(Expression::new("?", params))
    }

    /// `<column> <operator> <value>` with the column quoted.
    ///
    /// A fragment value is parenthesized and its parameters are reused;
    /// anything else goes through [`ExpressionBuilder::create_parameter`].
    pub fn comparison(
        &mut self,
        column: &str,
        operator: &str,
        value: impl Into<BindValue>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        let column = self.quote_identifier(column)?;

        match value.into() {
            BindValue::Fragment(fragment) => Ok(Expression::new(
                format!("{column} {operator} ({fragment})"),
                fragment.params(),
            )),
            value => {
                let param = self.create_parameter(value, ty, None)?;
                let sql = format!("{column} {operator} {param}");
                Ok(Expression::new(sql, param.params().clone()))
            }
        }
    }

    /// `<columnA> <operator> <columnB>`, both quoted, no parameters.
    pub fn comparison_columns(
        &self,
        column_a: &str,
        operator: &str,
        column_b: &str,
    ) -> DbalResult<Expression> {
        let column_a = self.quote_identifier(column_a)?;
        let column_b = self.quote_identifier(column_b)?;
        Ok(Expression::new(
            format!("{column_a} {operator} {column_b}"),
            ParamList::new(),
        ))
    }

    /// `(<fragment>) <operator> <value>` with parameters concatenated
    /// left-then-right.
    pub fn comparison_fragment(
        &mut self,
        fragment: &Fragment,
        operator: &str,
        value: impl Into<BindValue>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        match value.into() {
            BindValue::Fragment(rhs) => {
                let mut params = fragment.params();
                params.extend(&rhs.params());
                Ok(Expression::new(
                    format!("({fragment}) {operator} ({rhs})"),
                    params,
                ))
            }
            value => {
                let param = self.create_parameter(value, ty, None)?;
                let mut params = fragment.params();
                params.extend(param.params());
                Ok(Expression::new(
                    format!("({fragment}) {operator} {param}"),
                    params,
                ))
            }
        }
    }

    pub fn eq(
        &mut self,
        column: &str,
        value: impl Into<BindValue>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        self.comparison(column, Self::EQ, value, ty)
    }

    pub fn eq_columns(&self, column_a: &str, column_b: &str) -> DbalResult<Expression> {
        self.comparison_columns(column_a, Self::EQ, column_b)
    }

    pub fn neq(
        &mut self,
        column: &str,
        value: impl Into<BindValue>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        self.comparison(column, Self::NEQ, value, ty)
    }

    pub fn neq_columns(&self, column_a: &str, column_b: &str) -> DbalResult<Expression> {
        self.comparison_columns(column_a, Self::NEQ, column_b)
    }

    pub fn lt(
        &mut self,
        column: &str,
        value: impl Into<BindValue>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        self.comparison(column, Self::LT, value, ty)
    }

    pub fn lt_columns(&self, column_a: &str, column_b: &str) -> DbalResult<Expression> {
        self.comparison_columns(column_a, Self::LT, column_b)
    }

    pub fn lte(
        &mut self,
        column: &str,
        value: impl Into<BindValue>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        self.comparison(column, Self::LTE, value, ty)
    }

    pub fn lte_columns(&self, column_a: &str, column_b: &str) -> DbalResult<Expression> {
        self.comparison_columns(column_a, Self::LTE, column_b)
    }

    pub fn gt(
        &mut self,
        column: &str,
        value: impl Into<BindValue>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        self.comparison(column, Self::GT, value, ty)
    }

    pub fn gt_columns(&self, column_a: &str, column_b: &str) -> DbalResult<Expression> {
        self.comparison_columns(column_a, Self::GT, column_b)
    }

    pub fn gte(
        &mut self,
        column: &str,
        value: impl Into<BindValue>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        self.comparison(column, Self::GTE, value, ty)
    }

    pub fn gte_columns(&self, column_a: &str, column_b: &str) -> DbalResult<Expression> {
        self.comparison_columns(column_a, Self::GTE, column_b)
    }

    /// `<subject> IN (<values>)`.
    ///
    /// A single value collapses to one placeholder; a single fragment
    /// value is used verbatim. A multi-value list is deduplicated, has
    /// empty entries dropped, and binds one placeholder per survivor.
    /// An empty list (before or after filtering) is a logic error, and a
    /// fragment inside a multi-value list is too.
    pub fn in_list<V: Into<BindValue>>(
        &mut self,
        subject: impl Into<Operand>,
        values: impl IntoIterator<Item = V>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        let mut values: Vec<BindValue> = values.into_iter().map(Into::into).collect();
        let in_values = if values.len() == 1 {
            match values.pop().expect("len == 1") {
                BindValue::Fragment(fragment) => fragment,
                value => Fragment::from(self.create_parameter(value, ty, None)?),
            }
        } else {
            Fragment::from(self.list_fragment(values, ty)?)
        };
        self.compare_operand(subject.into(), "IN", BindValue::Fragment(in_values))
    }

    /// `<subject> NOT IN (<values>)`.
    ///
    /// Same list handling as [`ExpressionBuilder::in_list`], except a
    /// single fragment value is not accepted here.
    pub fn not_in<V: Into<BindValue>>(
        &mut self,
        subject: impl Into<Operand>,
        values: impl IntoIterator<Item = V>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        let mut values: Vec<BindValue> = values.into_iter().map(Into::into).collect();
        let in_values = if values.len() == 1 {
            let value = values.pop().expect("len == 1");
            Fragment::from(self.create_parameter(value, ty, None)?)
        } else {
            Fragment::from(self.list_fragment(values, ty)?)
        };
        self.compare_operand(subject.into(), "NOT IN", BindValue::Fragment(in_values))
    }

    /// `<subject> LIKE <pattern>`, optionally with an ESCAPE clause.
    pub fn like(
        &mut self,
        subject: impl Into<Operand>,
        pattern: &str,
        escape_char: Option<char>,
    ) -> DbalResult<Expression> {
        self.like_with_operator(subject.into(), "LIKE", pattern, escape_char)
    }

    /// `<subject> NOT LIKE <pattern>`, optionally with an ESCAPE clause.
    pub fn not_like(
        &mut self,
        subject: impl Into<Operand>,
        pattern: &str,
        escape_char: Option<char>,
    ) -> DbalResult<Expression> {
        self.like_with_operator(subject.into(), "NOT LIKE", pattern, escape_char)
    }

    fn like_with_operator(
        &mut self,
        subject: Operand,
        operator: &str,
        pattern: &str,
        escape_char: Option<char>,
    ) -> DbalResult<Expression> {
        let compared = self.compare_operand(subject, operator, BindValue::from(pattern))?;
        match escape_char {
            // The escape clause changes only the text, never the params.
            Some(escape) => Ok(Expression::new(
                format!("{compared} ESCAPE {escape}"),
                compared.params().clone(),
            )),
            None => Ok(compared),
        }
    }

    /// `NOT <column>` or `NOT (<fragment>)`.
    pub fn not(&self, subject: impl Into<Operand>) -> DbalResult<Expression> {
        match subject.into() {
            Operand::Column(column) => Ok(Expression::new(
                format!("NOT {}", self.quote_identifier(&column)?),
                ParamList::new(),
            )),
            Operand::Fragment(fragment) => Ok(Expression::new(
                format!("NOT ({fragment})"),
                fragment.params(),
            )),
        }
    }

    /// `<subject> IS NULL`.
    pub fn is_null(&self, subject: impl Into<Operand>) -> DbalResult<Expression> {
        self.null_check(subject.into(), "IS NULL")
    }

    /// `<subject> IS NOT NULL`.
    pub fn is_not_null(&self, subject: impl Into<Operand>) -> DbalResult<Expression> {
        self.null_check(subject.into(), "IS NOT NULL")
    }

    fn null_check(&self, subject: Operand, check: &str) -> DbalResult<Expression> {
        match subject {
            Operand::Column(column) => Ok(Expression::new(
                format!("{} {check}", self.quote_identifier(&column)?),
                ParamList::new(),
            )),
            Operand::Fragment(fragment) => Ok(Expression::new(
                format!("({fragment}) {check}"),
                fragment.params(),
            )),
        }
    }

    /// AND-combination of at least one part.
    pub fn and<P: Into<Part>>(
        &self,
        parts: impl IntoIterator<Item = P>,
    ) -> DbalResult<CompositeExpression> {
        let parts: Vec<Part> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(DbalError::invalid_argument(
                "At least one expression is required",
            ));
        }
        CompositeExpression::and(parts)
    }

    /// OR-combination of at least one part.
    pub fn or<P: Into<Part>>(
        &self,
        parts: impl IntoIterator<Item = P>,
    ) -> DbalResult<CompositeExpression> {
        let parts: Vec<Part> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(DbalError::invalid_argument(
                "At least one expression is required",
            ));
        }
        CompositeExpression::or(parts)
    }

    /// Quote an identifier through the platform. Dots separate pieces.
    pub fn quote_identifier(&self, name: &str) -> DbalResult<String> {
        if name.is_empty() {
            return Err(DbalError::invalid_argument(
                "The identifier cannot be an empty string",
            ));
        }
        Ok(self.platform.quote_identifier(name))
    }

    /// Escape hatch: wrap caller-supplied SQL text and parameters
    /// verbatim, with no validation of either.
    pub fn raw(&self, sql: impl Into<String>, params: ParamList) -> Expression {
        Expression::new(sql, params)
    }

    /// A pre-quoted table reference, optionally qualified by a database
    /// name, accepted verbatim by the insert helpers.
    pub fn raw_table_name(&self, table: &str, database: Option<&str>) -> TableName {
        let mut quoted = self.platform.quote_single_identifier(table);
        if let Some(database) = database {
            quoted = format!(
                "{}.{quoted}",
                self.platform.quote_single_identifier(database)
            );
        }
        TableName::new(quoted)
    }

    fn compare_operand(
        &mut self,
        subject: Operand,
        operator: &str,
        value: BindValue,
    ) -> DbalResult<Expression> {
        match subject {
            Operand::Column(column) => self.comparison(&column, operator, value, None),
            Operand::Fragment(fragment) => {
                self.comparison_fragment(&fragment, operator, value, None)
            }
        }
    }

    /// One placeholder fragment per surviving list member, comma-joined.
    fn list_fragment(
        &mut self,
        values: Vec<BindValue>,
        ty: Option<BindType>,
    ) -> DbalResult<Expression> {
        let values = dedup_and_filter(values);
        if values.is_empty() {
            return Err(DbalError::logic(
                "The list of values for the IN operator cannot be empty",
            ));
        }

        let mut params = ParamList::new();
        let mut placeholders = Vec::with_capacity(values.len());
        for value in values {
            let param = match value {
                BindValue::Fragment(_) => {
                    return Err(DbalError::logic(
                        "Only one SQL fragment value can be passed to the IN operator",
                    ));
                }
                BindValue::Param(param) => param,
                BindValue::Value(value) => match &ty {
                    Some(ty) => Parameter::typed(value, ty.clone()),
                    None => Parameter::new(value),
                },
            };
            if self.use_named_parameters {
                let placeholder = self.next_placeholder();
                placeholders.push(placeholder.clone());
                params.push_named(placeholder, param);
            } else {
                placeholders.push("?".to_string());
                params.push(param);
            }
        }

        Ok(Expression::new(placeholders.join(","), params))
    }

    fn next_placeholder(&mut self) -> String {
        let placeholder = format!(":yebValue{}", self.bound_counter);
        self.bound_counter += 1;
        placeholder
    }
}

/// First occurrence wins, then loosely-empty entries are dropped.
fn dedup_and_filter(values: Vec<BindValue>) -> Vec<BindValue> {
    let mut unique: Vec<BindValue> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.iter().any(|seen| seen == &value) {
            unique.push(value);
        }
    }
    unique.retain(|value| !value.is_empty_value());
    unique
}
