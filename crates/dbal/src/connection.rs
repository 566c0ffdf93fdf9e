//! A managed database connection: insert helpers, identifier quoting,
//! and the expression-builder factory.

use crate::driver::Driver;
use crate::error::{DbalError, DbalResult};
use crate::expr::{ExpressionBuilder, ParamList, Parameter, TableName};

/// A table argument: a plain name (quoted by the platform) or an
/// already-quoted [`TableName`].
#[derive(Clone, Debug)]
pub enum TableRef {
    Name(String),
    Raw(TableName),
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::Name(name.to_string())
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::Name(name)
    }
}

impl From<TableName> for TableRef {
    fn from(table: TableName) -> Self {
        TableRef::Raw(table)
    }
}

/// One named database connection.
///
/// Owns the driver handle and the connection-level binding mode; the
/// insert helpers always use positional `?` placeholders, while the
/// binding mode governs the expression builders this connection hands
/// out.
pub struct Connection {
    driver: Box<dyn Driver>,
    use_named_parameters: bool,
    log_sql: bool,
    expr: Option<ExpressionBuilder>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("use_named_parameters", &self.use_named_parameters)
            .field("log_sql", &self.log_sql)
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub fn new(driver: Box<dyn Driver>, use_named_parameters: bool) -> Self {
        Self {
            driver,
            use_named_parameters,
            log_sql: false,
            expr: None,
        }
    }

    /// Emit a tracing event for every statement handed to the driver.
    pub fn with_sql_logging(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    /// Whether expression builders from this connection emit named
    /// placeholders.
    pub fn use_named_parameters(&self) -> bool {
        self.use_named_parameters
    }

    /// A fresh builder bound to this connection's platform and binding
    /// mode. Prefer one builder per statement.
    pub fn create_expression_builder(&self) -> ExpressionBuilder {
        ExpressionBuilder::new(self.driver.platform(), self.use_named_parameters)
    }

    /// The connection's cached builder, created on first use. At most
    /// one exists per connection; its placeholder counter keeps climbing
    /// across statements.
    pub fn expr(&mut self) -> &mut ExpressionBuilder {
        if self.expr.is_none() {
            self.expr = Some(self.create_expression_builder());
        }
        self.expr.as_mut().expect("initialized above")
    }

    /// Insert one row. One `?` placeholder per value, in map order.
    ///
    /// Returns the driver's affected-row count. A value's bind type (if
    /// any) travels with it to the driver.
    pub fn insert(&self, table: impl Into<TableRef>, values: &[(&str, Parameter)]) -> DbalResult<u64> {
        let table = self.table_sql(table.into())?;

        let mut columns = Vec::with_capacity(values.len());
        let mut params = ParamList::new();
        for (column, value) in values {
            columns.push(self.quote_single_identifier(column)?);
            params.push(value.clone());
        }
        let placeholders = vec!["?"; values.len()].join(",");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(","),
            placeholders
        );
        self.execute_statement(&sql, &params)
    }

    /// Insert many rows with a single multi-row statement.
    ///
    /// Fails on an empty column list and on any row whose arity differs
    /// from the column list (naming the row). An empty row set executes
    /// nothing and reports zero affected rows.
    pub fn batch_insert(
        &self,
        table: impl Into<TableRef>,
        columns: &[&str],
        rows: &[Vec<Parameter>],
    ) -> DbalResult<u64> {
        if columns.is_empty() {
            return Err(DbalError::invalid_argument(
                "The columns argument cannot be empty",
            ));
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let table = self.table_sql(table.into())?;
        let quoted: Vec<String> = columns
            .iter()
            .map(|column| self.quote_single_identifier(column))
            .collect::<DbalResult<_>>()?;

        let mut params = ParamList::new();
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DbalError::invalid_argument(format!(
                    "The number of values in row {row_index} is different from the number of columns"
                )));
            }
            for value in row {
                params.push(value.clone());
            }
        }

        let row_group = format!("({})", vec!["?"; columns.len()].join(","));
        let placeholders = vec![row_group; rows.len()].join(",");

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            quoted.join(","),
            placeholders
        );
        self.execute_statement(&sql, &params)
    }

    /// Hand a statement to the driver.
    ///
    /// The SQL text plus the parameter list (with its bind-type hints)
    /// is the wire contract; driver errors propagate verbatim.
    pub fn execute_statement(&self, sql: &str, params: &ParamList) -> DbalResult<u64> {
        if self.log_sql {
            tracing::debug!(
                target: "dbal.sql",
                sql,
                param_count = params.len(),
                "executing statement"
            );
        }
        self.driver.execute_statement(sql, params)
    }

    /// Quote a possibly-dotted identifier. Fails on empty input.
    pub fn quote_identifier(&self, value: &str) -> DbalResult<String> {
        if value.is_empty() {
            return Err(DbalError::invalid_argument(
                "The identifier cannot be an empty string",
            ));
        }
        Ok(self.driver.platform().quote_identifier(value))
    }

    /// Quote one identifier piece. Fails on empty input.
    pub fn quote_single_identifier(&self, value: &str) -> DbalResult<String> {
        if value.is_empty() {
            return Err(DbalError::invalid_argument(
                "The identifier cannot be an empty string",
            ));
        }
        Ok(self.driver.platform().quote_single_identifier(value))
    }

    fn table_sql(&self, table: TableRef) -> DbalResult<String> {
        match table {
            TableRef::Name(name) => self.quote_identifier(&name),
            TableRef::Raw(table) => Ok(table.as_str().to_string()),
        }
    }
}
