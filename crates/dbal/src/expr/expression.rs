//! SQL fragments: leaf expressions and AND/OR composites.
//!
//! A [`Fragment`] is anything that renders to SQL text and reports the
//! parameters it binds: either a leaf [`Expression`] (raw text plus its
//! own parameter list) or a [`CompositeExpression`] (an AND/OR grouping
//! of parts). Fragments are immutable; composition always produces new
//! values.

use crate::error::{DbalError, DbalResult};
use crate::expr::param::ParamList;
use std::fmt;

/// A leaf SQL fragment: raw text plus the parameters it binds.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    sql: String,
    params: ParamList,
}

impl Expression {
    /// Wrap raw SQL text and its parameter list verbatim.
    pub fn new(sql: impl Into<String>, params: ParamList) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// The raw SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// The parameter list, unmodified.
    pub fn params(&self) -> &ParamList {
        &self.params
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Join kind for a composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeKind {
    And,
    Or,
}

impl CompositeKind {
    fn as_str(self) -> &'static str {
        match self {
            CompositeKind::And => "AND",
            CompositeKind::Or => "OR",
        }
    }
}

/// One member of a composite: a raw SQL string or a nested fragment.
#[derive(Clone, Debug, PartialEq)]
pub enum Part {
    Sql(String),
    Fragment(Fragment),
}

impl Part {
    /// Empty parts are rejected at composite construction time: a blank
    /// string, or a composite fragment with zero parts.
    fn is_empty(&self) -> bool {
        match self {
            Part::Sql(sql) => sql.trim().is_empty(),
            Part::Fragment(Fragment::Composite(composite)) => composite.count() == 0,
            Part::Fragment(Fragment::Expr(_)) => false,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Sql(sql) => f.write_str(sql),
            Part::Fragment(fragment) => fmt::Display::fmt(fragment, f),
        }
    }
}

impl From<&str> for Part {
    fn from(sql: &str) -> Self {
        Part::Sql(sql.to_string())
    }
}

impl From<String> for Part {
    fn from(sql: String) -> Self {
        Part::Sql(sql)
    }
}

impl From<Expression> for Part {
    fn from(expression: Expression) -> Self {
        Part::Fragment(Fragment::Expr(expression))
    }
}

impl From<CompositeExpression> for Part {
    fn from(composite: CompositeExpression) -> Self {
        Part::Fragment(Fragment::Composite(composite))
    }
}

impl From<Fragment> for Part {
    fn from(fragment: Fragment) -> Self {
        Part::Fragment(fragment)
    }
}

/// An immutable AND/OR combination of parts.
///
/// Renders with every part parenthesized once there is more than one:
/// `(a) AND (b)`. A single part renders unwrapped; zero parts render as
/// the empty string.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeExpression {
    kind: CompositeKind,
    parts: Vec<Part>,
}

impl CompositeExpression {
    /// AND-combination of the given parts.
    pub fn and<P: Into<Part>>(parts: impl IntoIterator<Item = P>) -> DbalResult<Self> {
        Self::with_kind(CompositeKind::And, parts)
    }

    /// OR-combination of the given parts.
    pub fn or<P: Into<Part>>(parts: impl IntoIterator<Item = P>) -> DbalResult<Self> {
        Self::with_kind(CompositeKind::Or, parts)
    }

    fn with_kind<P: Into<Part>>(
        kind: CompositeKind,
        parts: impl IntoIterator<Item = P>,
    ) -> DbalResult<Self> {
        let parts: Vec<Part> = parts.into_iter().map(Into::into).collect();
        Self::check_parts(&parts)?;
        Ok(Self { kind, parts })
    }

    fn check_parts(parts: &[Part]) -> DbalResult<()> {
        if parts.iter().any(Part::is_empty) {
            return Err(DbalError::logic(
                "A composite expression cannot contain empty elements",
            ));
        }
        Ok(())
    }

    /// The join kind of this composite.
    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    /// Number of direct parts. Not a parameter count; see
    /// [`CompositeExpression::param_count`].
    pub fn count(&self) -> usize {
        self.parts.len()
    }

    /// A new composite holding this one's parts followed by `parts`.
    ///
    /// With zero additional parts the result is content-equal to the
    /// receiver. The receiver is never mutated.
    pub fn with<P: Into<Part>>(&self, parts: impl IntoIterator<Item = P>) -> DbalResult<Self> {
        let new_parts: Vec<Part> = parts.into_iter().map(Into::into).collect();
        Self::check_parts(&new_parts)?;
        if new_parts.is_empty() {
            return Ok(self.clone());
        }
        let mut parts = self.parts.clone();
        parts.extend(new_parts);
        Ok(Self {
            kind: self.kind,
            parts,
        })
    }

    /// Total bound parameters across all parts.
    pub fn param_count(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Sql(_) => 0,
                Part::Fragment(fragment) => fragment.param_count(),
            })
            .sum()
    }

    /// The concatenation, in part order, of every fragment part's
    /// parameters. Raw string parts contribute none.
    pub fn params(&self) -> ParamList {
        let mut out = ParamList::new();
        self.collect_params(&mut out);
        out
    }

    pub(crate) fn collect_params(&self, out: &mut ParamList) {
        for part in &self.parts {
            if let Part::Fragment(fragment) = part {
                fragment.collect_params(out);
            }
        }
    }
}

impl fmt::Display for CompositeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parts.as_slice() {
            [] => Ok(()),
            [part] => fmt::Display::fmt(part, f),
            parts => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", self.kind.as_str())?;
                    }
                    write!(f, "({part})")?;
                }
                Ok(())
            }
        }
    }
}

/// A built SQL fragment of either shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    Expr(Expression),
    Composite(CompositeExpression),
}

impl Fragment {
    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        match self {
            Fragment::Expr(expression) => expression.param_count(),
            Fragment::Composite(composite) => composite.param_count(),
        }
    }

    /// The ordered parameters this fragment binds.
    pub fn params(&self) -> ParamList {
        match self {
            Fragment::Expr(expression) => expression.params().clone(),
            Fragment::Composite(composite) => composite.params(),
        }
    }

    pub(crate) fn collect_params(&self, out: &mut ParamList) {
        match self {
            Fragment::Expr(expression) => out.extend(expression.params()),
            Fragment::Composite(composite) => composite.collect_params(out),
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Expr(expression) => fmt::Display::fmt(expression, f),
            Fragment::Composite(composite) => fmt::Display::fmt(composite, f),
        }
    }
}

impl From<Expression> for Fragment {
    fn from(expression: Expression) -> Self {
        Fragment::Expr(expression)
    }
}

impl From<CompositeExpression> for Fragment {
    fn from(composite: CompositeExpression) -> Self {
        Fragment::Composite(composite)
    }
}

/// An already-quoted table reference, passed verbatim to the insert
/// helpers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableName {
    raw: String,
}

impl TableName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
