//! MongoDB backend for OData filters
//!
//! [`compile`] turns a parsed `$filter` tree into a filter document and
//! [`FindQuery`] adds projection, sort and paging from the other query options.

pub mod compile;
pub mod find;
pub mod options;

pub use compile::{compile, compile_with};
pub use find::{CountQuery, FindQuery};
pub use options::MongoOptions;

use bson::Document;

/// Parse and compile a filter string in one step
pub fn filter_document(filter: &str, options: &MongoOptions) -> sieve_odata::Result<Document> {
    let tree = sieve_odata::parse_filter(filter)?;
    Ok(compile_with(&tree, options)?)
}

/// Parse a query string and compile it into a [`FindQuery`]
pub fn find_query(query: &str, options: &MongoOptions) -> sieve_odata::Result<FindQuery> {
    let parsed = sieve_odata::parse_query_string(query)?;
    Ok(FindQuery::from_options(&parsed, options)?)
}
