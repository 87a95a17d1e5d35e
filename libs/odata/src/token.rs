//! Token types for the filter grammar

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt;

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    OpenParen,
    CloseParen,
    Comma,
    LogicalOp,
    Function,
    Float,
    Integer,
    String,
    Date,
    Time,
    DateTime,
    Boolean,
    /// Identifier (field name)
    Literal,
}

impl TokenKind {
    /// Anything that is not punctuation, an operator or a function.
    pub fn is_literal(self) -> bool {
        !matches!(
            self,
            TokenKind::OpenParen
                | TokenKind::CloseParen
                | TokenKind::Comma
                | TokenKind::LogicalOp
                | TokenKind::Function
        )
    }

    pub fn is_operator(self) -> bool {
        matches!(self, TokenKind::LogicalOp | TokenKind::Function)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::OpenParen => "open paren",
            TokenKind::CloseParen => "close paren",
            TokenKind::Comma => "comma",
            TokenKind::LogicalOp => "logical operator",
            TokenKind::Function => "function",
            TokenKind::Float => "float",
            TokenKind::Integer => "integer",
            TokenKind::String => "string",
            TokenKind::Date => "date",
            TokenKind::Time => "time",
            TokenKind::DateTime => "datetime",
            TokenKind::Boolean => "boolean",
            TokenKind::Literal => "identifier",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed value carried by a token.
///
/// Operators, functions and punctuation carry their symbol as `String`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
}

impl LiteralValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            LiteralValue::Int(_) => "integer",
            LiteralValue::Float(_) => "float",
            LiteralValue::Bool(_) => "boolean",
            LiteralValue::String(_) => "string",
            LiteralValue::Date(_) => "date",
            LiteralValue::Time(_) => "time",
            LiteralValue::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(i) => write!(f, "{i}"),
            LiteralValue::Float(x) => write!(f, "{x}"),
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::String(s) => f.write_str(s),
            LiteralValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            LiteralValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            LiteralValue::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
        }
    }
}

/// A token produced by the tokenizer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, whitespace trimmed
    pub raw: String,
    pub value: LiteralValue,
    /// Byte offset in the input
    pub position: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        raw: impl Into<String>,
        value: LiteralValue,
        position: usize,
    ) -> Self {
        Self {
            kind,
            raw: raw.into(),
            value,
            position,
        }
    }

    /// Symbol used for dispatch: operator and function names, field names.
    pub fn symbol(&self) -> &str {
        self.value.as_str().unwrap_or(&self.raw)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
