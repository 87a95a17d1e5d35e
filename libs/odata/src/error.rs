//! Error types for filter parsing and compilation
//!
//! Each stage has its own error enum. [`Error`] is the boundary type that
//! callers see; every variant is a client error.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised anywhere between the raw filter string and a backend filter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid filter syntax: {0}")]
    Lex(#[from] LexError),

    #[error("invalid filter syntax: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid filter syntax: {0}")]
    Compile(#[from] CompileError),

    #[error("invalid query: {0}")]
    Query(#[from] QueryError),
}

/// Tokenizer failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("no token matches at position {position}: '{remaining}'")]
    NoMatch { position: usize, remaining: String },

    #[error("invalid {kind} literal '{text}' at position {position}: {message}")]
    InvalidLiteral {
        kind: &'static str,
        text: String,
        position: usize,
        message: String,
    },
}

/// Shunting-Yard and tree-building failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected comma at position {position}")]
    UnexpectedComma { position: usize },

    #[error("mismatched parenthesis at position {position}")]
    MismatchedParenthesis { position: usize },

    #[error("two literals in a row: '{first}' followed by '{second}'")]
    TwoLiteralsInARow { first: String, second: String },

    #[error("missing operand for '{operator}'")]
    MissingOperand { operator: String },

    #[error("operands of '{operator}' mix expressions and values")]
    OperandTypeMismatch { operator: String },

    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("empty filter")]
    Empty,

    #[error("malformed filter: {remaining} dangling expressions")]
    Malformed { remaining: usize },

    #[error("filter nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Backend compilation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("left side of a comparison must be a field name, found '{0}'")]
    InvalidKey(String),

    #[error("right side of a comparison on '{field}' must be a value")]
    InvalidValue { field: String },

    #[error("'{0}' is not a 24 character hex object id")]
    InvalidIdFormat(String),

    #[error("operator '{0}' is not supported by this backend")]
    UnsupportedOperator(String),

    #[error("{function}() expects a string pattern, found {found}")]
    NonStringOperand {
        function: &'static str,
        found: &'static str,
    },

    #[error("expected a filter expression, found '{0}'")]
    ExpectedExpression(String),

    #[error("value {0} is out of range")]
    OutOfRange(u64),
}

/// Flat query-option failures, reported together.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", join_issues(.issues))]
pub struct QueryError {
    pub issues: Vec<QueryIssue>,
}

fn join_issues(issues: &[QueryIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single problem found while reading query options
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryIssue {
    #[error("duplicate keyword '{0}'")]
    Duplicate(String),

    #[error("missing value for '{0}'")]
    MissingValue(String),

    #[error("unknown keyword '{0}'")]
    UnknownKeyword(String),

    #[error("$count and $inlinecount cannot be used together")]
    CountAndInlineCount,

    #[error("{keyword} must be a non-negative integer, found '{value}'")]
    InvalidInteger { keyword: &'static str, value: String },

    #[error("$inlinecount must be 'allpages' or 'none', found '{0}'")]
    InvalidInlineCount(String),

    #[error("$count must be 'true' or 'false', found '{0}'")]
    InvalidBoolean(String),

    #[error("invalid field name '{0}'")]
    InvalidField(String),

    #[error("too many terms in $orderby item '{0}'")]
    TooManyOrderTerms(String),

    #[error("$orderby direction must be 'asc' or 'desc', found '{0}'")]
    InvalidOrderDirection(String),

    #[error("$filter: {0}")]
    Filter(Box<Error>),
}
