//! Filter tokenizer
//!
//! Regex driven: an ordered list of token matchers is tried at the current
//! position and the first non-empty match wins. Whitespace is recognised by
//! the ignore matchers and dropped. There is no backtracking.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LexError;
use crate::grammar;
use crate::token::{LiteralValue, Token, TokenKind};

struct Matcher {
    pattern: Regex,
    kind: TokenKind,
}

/// Ordered set of token and ignore patterns
pub struct Tokenizer {
    token_matchers: Vec<Matcher>,
    ignore_matchers: Vec<Regex>,
}

static FILTER_TOKENIZER: Lazy<Tokenizer> = Lazy::new(|| {
    Tokenizer::filter().expect("filter token patterns are valid regular expressions")
});

/// Tokenize a filter expression
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    FILTER_TOKENIZER.tokenize(input)
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Create a tokenizer with no patterns
    pub fn new() -> Self {
        Self {
            token_matchers: Vec::new(),
            ignore_matchers: Vec::new(),
        }
    }

    /// Tokenizer for the `$filter` grammar
    pub fn filter() -> Result<Self, regex::Error> {
        let mut t = Self::new();
        t.add_token_matcher(r"^\(", TokenKind::OpenParen)?;
        t.add_token_matcher(r"^\)", TokenKind::CloseParen)?;
        t.add_token_matcher(r"^,", TokenKind::Comma)?;
        t.add_token_matcher(r"^(eq|ne|gt|ge|lt|le|and|or)\s", TokenKind::LogicalOp)?;
        t.add_token_matcher(
            r"^-?[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]+)?)?(Z|[+-][0-9]{2}:[0-9]{2})?",
            TokenKind::DateTime,
        )?;
        t.add_token_matcher(r"^-?[0-9]{4}-[0-9]{2}-[0-9]{2}", TokenKind::Date)?;
        t.add_token_matcher(r"^[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]+)?)?", TokenKind::Time)?;
        t.add_token_matcher(r"^-?[0-9]+\.[0-9]+", TokenKind::Float)?;
        t.add_token_matcher(r"^-?[0-9]+", TokenKind::Integer)?;
        t.add_token_matcher(r"^(?i:true|false)\b", TokenKind::Boolean)?;
        t.add_token_matcher(r"^'(''|[^'])*'", TokenKind::String)?;
        t.add_token_matcher(r"^_id\b", TokenKind::Literal)?;
        t.add_token_matcher(r"^[a-zA-Z][a-zA-Z0-9_.]*", TokenKind::Literal)?;
        t.add_ignore_matcher(r"^\s+")?;
        Ok(t)
    }

    /// Append a token pattern. Patterns are tried in insertion order.
    pub fn add_token_matcher(
        &mut self,
        pattern: &str,
        kind: TokenKind,
    ) -> Result<(), regex::Error> {
        self.token_matchers.push(Matcher {
            pattern: Regex::new(pattern)?,
            kind,
        });
        Ok(())
    }

    pub fn add_ignore_matcher(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.ignore_matchers.push(Regex::new(pattern)?);
        Ok(())
    }

    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut position = 0;

        'scan: while position < input.len() {
            let rest = &input[position..];

            for matcher in &self.token_matchers {
                if let Some(m) = matcher.pattern.find(rest) {
                    if m.end() == 0 {
                        continue;
                    }
                    tokens.push(classify(matcher.kind, m.as_str().trim(), position)?);
                    position += m.end();
                    continue 'scan;
                }
            }

            for ignore in &self.ignore_matchers {
                if let Some(m) = ignore.find(rest) {
                    if m.end() > 0 {
                        position += m.end();
                        continue 'scan;
                    }
                }
            }

            return Err(LexError::NoMatch {
                position,
                remaining: rest.to_string(),
            });
        }

        tracing::trace!(count = tokens.len(), "tokenized filter");
        Ok(tokens)
    }
}

/// Build a token from matched text, converting literal values.
fn classify(kind: TokenKind, raw: &str, position: usize) -> Result<Token, LexError> {
    let invalid = |message: String| LexError::InvalidLiteral {
        kind: kind.as_str(),
        text: raw.to_string(),
        position,
        message,
    };

    let (kind, value) = match kind {
        TokenKind::Integer => {
            let i = raw.parse::<i64>().map_err(|e| invalid(e.to_string()))?;
            (kind, LiteralValue::Int(i))
        }
        TokenKind::Float => {
            let x = raw.parse::<f64>().map_err(|e| invalid(e.to_string()))?;
            if !x.is_finite() {
                return Err(invalid("value out of range".to_string()));
            }
            (kind, LiteralValue::Float(x))
        }
        TokenKind::Boolean => (kind, LiteralValue::Bool(raw.eq_ignore_ascii_case("true"))),
        TokenKind::String => (kind, LiteralValue::String(unquote(raw))),
        TokenKind::Date => {
            let value = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(LiteralValue::Date)
                .unwrap_or_else(|_| LiteralValue::String(raw.to_string()));
            (kind, value)
        }
        TokenKind::Time => {
            let value = parse_time(raw)
                .map(LiteralValue::Time)
                .unwrap_or_else(|| LiteralValue::String(raw.to_string()));
            (kind, value)
        }
        TokenKind::DateTime => {
            let value = parse_datetime(raw)
                .map(LiteralValue::DateTime)
                .unwrap_or_else(|| LiteralValue::String(raw.to_string()));
            (kind, value)
        }
        // Function names and operator words never stand as identifiers
        TokenKind::Literal if grammar::is_reserved(raw) => {
            let kind = if grammar::function(raw).is_some() {
                TokenKind::Function
            } else {
                TokenKind::LogicalOp
            };
            (kind, LiteralValue::String(raw.to_string()))
        }
        _ => (kind, LiteralValue::String(raw.to_string())),
    };

    Ok(Token::new(kind, raw, value, position))
}

/// Strip the delimiting quotes and collapse `''` to `'`.
fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw);
    inner.replace("''", "'")
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

/// Parse `YYYY-MM-DDTHH:MM[:SS[.f]][Z|±HH:MM]`. A missing offset means UTC.
fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let t = text.find('T')?;
    let (naive, offset) = if let Some(stripped) = text.strip_suffix('Z') {
        (stripped, FixedOffset::east_opt(0)?)
    } else if let Some(i) = text[t..].rfind(|c: char| c == '+' || c == '-') {
        let (naive, offset) = text.split_at(t + i);
        (naive, parse_offset(offset)?)
    } else {
        (text, FixedOffset::east_opt(0)?)
    };

    let naive = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M"))
        .ok()?;
    offset.from_local_datetime(&naive).single()
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    let sign = match text.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, minutes) = text[1..].split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
