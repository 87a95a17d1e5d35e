//! Full SELECT / count statements from query options

use serde::Serialize;

use sieve_odata::{CompileError, OrderDirection, ParseNode, QueryOptions};

use crate::bind::BindValue;
use crate::compile::{compile_into, json_text};
use crate::options::SqlOptions;
use crate::quote::{quote_identifier, quote_literal};

/// A complete statement and its bind values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// `SELECT ... FROM table [WHERE ...] [ORDER BY ...] [LIMIT n] [OFFSET m]`
pub fn select_statement(
    table: &str,
    options: &QueryOptions,
    sql_options: &SqlOptions,
) -> Result<SqlQuery, CompileError> {
    let column = quote_identifier(&sql_options.data_column);
    let mut binds = Vec::new();

    let columns = if options.select.is_empty() {
        "*".to_string()
    } else {
        options
            .select
            .iter()
            .map(|field| {
                format!(
                    "{column} -> {} AS {}",
                    quote_literal(field),
                    quote_identifier(field)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!("SELECT {columns} FROM {}", quote_identifier(table));

    if let Some(filter) = &options.filter {
        let clause = compile_into(filter, sql_options, &mut binds)?;
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }

    if !options.order_by.is_empty() {
        let terms = options
            .order_by
            .iter()
            .map(|item| {
                let term = json_text(&sql_options.data_column, &item.field);
                match item.direction {
                    OrderDirection::Asc => term,
                    OrderDirection::Desc => format!("{term} DESC"),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" ORDER BY ");
        sql.push_str(&terms);
    }

    if let Some(top) = options.top {
        sql.push_str(&format!(" LIMIT {}", bigint(top)?));
    }
    if let Some(skip) = options.skip {
        sql.push_str(&format!(" OFFSET {}", bigint(skip)?));
    }

    tracing::debug!(sql = %sql, binds = binds.len(), "built select statement");
    Ok(SqlQuery { sql, binds })
}

/// `SELECT count(*) FROM table [WHERE ...]`
///
/// The filter is passed in by the caller; nothing is remembered between calls.
pub fn count_statement(
    table: &str,
    filter: Option<&ParseNode>,
    sql_options: &SqlOptions,
) -> Result<SqlQuery, CompileError> {
    let mut binds = Vec::new();
    let mut sql = format!("SELECT count(*) FROM {}", quote_identifier(table));
    if let Some(filter) = filter {
        let clause = compile_into(filter, sql_options, &mut binds)?;
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
    }
    Ok(SqlQuery { sql, binds })
}

fn bigint(n: u64) -> Result<i64, CompileError> {
    i64::try_from(n).map_err(|_| CompileError::OutOfRange(n))
}
