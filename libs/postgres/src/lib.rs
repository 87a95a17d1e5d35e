//! PostgreSQL JSONB backend for OData filters
//!
//! Documents live in a single JSONB column. Filters compile to `WHERE`
//! fragments that read fields with `->>` and pass values as `$n` parameters
//! (or inline literals, see [`ParameterStyle`]). Table, column and alias names
//! always go through [`quote::quote_identifier`].

pub mod bind;
pub mod compile;
pub mod options;
pub mod quote;
pub mod statement;

#[cfg(feature = "sqlx")]
mod driver;

pub use bind::BindValue;
pub use compile::{compile, compile_with, SqlFragment};
pub use options::{ParameterStyle, SqlOptions};
pub use statement::{count_statement, select_statement, SqlQuery};

/// Parse a query string and build the SELECT statement for `table`
pub fn select_query(
    table: &str,
    query: &str,
    options: &SqlOptions,
) -> sieve_odata::Result<SqlQuery> {
    let parsed = sieve_odata::parse_query_string(query)?;
    Ok(select_statement(table, &parsed, options)?)
}

/// Parse a query string and build the count statement for `table`
pub fn count_query(table: &str, query: &str, options: &SqlOptions) -> sieve_odata::Result<SqlQuery> {
    let parsed = sieve_odata::parse_query_string(query)?;
    Ok(count_statement(table, parsed.filter.as_ref(), options)?)
}
