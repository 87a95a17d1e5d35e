//! OData `$filter` front end
//!
//! Turns a filter string into a validated parse tree in three pure stages:
//!
//! 1. [`lexer::tokenize`] classifies the input into typed tokens.
//! 2. [`parser::infix_to_postfix`] reorders them with the Shunting-Yard algorithm
//!    using the operator table in [`grammar`].
//! 3. [`tree::postfix_to_tree`] assembles and validates the [`ParseNode`] tree.
//!
//! Backend crates walk the tree through [`ParseNode::shape`]. The
//! [`query`] module reads the surrounding query options (`$top`, `$orderby`, ...).
//!
//! ```
//! let tree = sieve_odata::parse_filter("a eq 1 and b eq 2 or c eq 3").unwrap();
//! assert_eq!(tree.to_string(), "(or (and (eq a 1) (eq b 2)) (eq c 3))");
//! ```

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod token;
pub mod tree;

pub use error::{CompileError, Error, LexError, ParseError, QueryError, QueryIssue, Result};
pub use grammar::{BinaryOperator, StringFunction};
pub use query::{
    parse_query_pairs, parse_query_string, InlineCount, OrderDirection, OrderItem, QueryOptions,
};
pub use token::{LiteralValue, Token, TokenKind};
pub use tree::{NodeShape, ParseNode};

/// Parse a `$filter` expression into a tree
pub fn parse_filter(input: &str) -> Result<ParseNode> {
    let tokens = lexer::tokenize(input)?;
    let postfix = parser::infix_to_postfix(tokens)?;
    let tree = tree::postfix_to_tree(postfix)?;
    tracing::debug!(filter = %input, tree = %tree, "parsed filter");
    Ok(tree)
}
