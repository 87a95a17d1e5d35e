//! Flat query options (`$filter`, `$top`, `$skip`, `$select`, `$orderby`,
//! `$count`, `$inlinecount`)
//!
//! Every problem in a query string is collected and reported at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{QueryError, QueryIssue};
use crate::tree::ParseNode;

pub const FILTER: &str = "$filter";
pub const TOP: &str = "$top";
pub const SKIP: &str = "$skip";
pub const SELECT: &str = "$select";
pub const ORDER_BY: &str = "$orderby";
pub const COUNT: &str = "$count";
pub const INLINE_COUNT: &str = "$inlinecount";

static FIELD_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("field name pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineCount {
    #[default]
    None,
    AllPages,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub field: String,
    pub direction: OrderDirection,
}

/// Parsed query options
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOptions {
    pub filter: Option<ParseNode>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
    /// Selected fields; empty means every field
    pub select: Vec<String>,
    pub order_by: Vec<OrderItem>,
    pub count: bool,
    pub inline_count: InlineCount,
}

/// Parse a raw (URL encoded) query string, with or without a leading `?`.
pub fn parse_query_string(query: &str) -> Result<QueryOptions, QueryError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    parse_query_pairs(url::form_urlencoded::parse(query.as_bytes()))
}

/// Parse already decoded key/value pairs.
pub fn parse_query_pairs<I, K, V>(pairs: I) -> Result<QueryOptions, QueryError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        grouped
            .entry(key.as_ref().to_string())
            .or_default()
            .push(value.as_ref().to_string());
    }

    let mut options = QueryOptions::default();
    let mut issues = Vec::new();

    if grouped.contains_key(COUNT) && grouped.contains_key(INLINE_COUNT) {
        issues.push(QueryIssue::CountAndInlineCount);
    }

    for (key, values) in &grouped {
        if values.len() > 1 {
            issues.push(QueryIssue::Duplicate(key.clone()));
            continue;
        }
        let value = values[0].as_str();
        if value.is_empty() && key != COUNT {
            issues.push(QueryIssue::MissingValue(key.clone()));
            continue;
        }

        let result = match key.as_str() {
            FILTER => crate::parse_filter(value)
                .map(|node| options.filter = Some(node))
                .map_err(|e| vec![QueryIssue::Filter(Box::new(e))]),
            TOP => parse_count_value(TOP, value).map(|n| options.top = Some(n)),
            SKIP => parse_count_value(SKIP, value).map(|n| options.skip = Some(n)),
            SELECT => parse_select(value).map(|fields| options.select = fields),
            ORDER_BY => parse_order_by(value).map(|items| options.order_by = items),
            COUNT => parse_bool(value).map(|b| options.count = b),
            INLINE_COUNT => parse_inline_count(value).map(|c| options.inline_count = c),
            _ => Err(vec![QueryIssue::UnknownKeyword(key.clone())]),
        };
        if let Err(mut found) = result {
            issues.append(&mut found);
        }
    }

    if issues.is_empty() {
        tracing::debug!(
            has_filter = options.filter.is_some(),
            top = ?options.top,
            skip = ?options.skip,
            "parsed query options"
        );
        Ok(options)
    } else {
        Err(QueryError { issues })
    }
}

fn parse_count_value(keyword: &'static str, value: &str) -> Result<u64, Vec<QueryIssue>> {
    value.trim().parse::<u64>().map_err(|_| {
        vec![QueryIssue::InvalidInteger {
            keyword,
            value: value.to_string(),
        }]
    })
}

fn parse_bool(value: &str) -> Result<bool, Vec<QueryIssue>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(vec![QueryIssue::InvalidBoolean(value.to_string())]),
    }
}

fn parse_inline_count(value: &str) -> Result<InlineCount, Vec<QueryIssue>> {
    match value.trim() {
        "allpages" => Ok(InlineCount::AllPages),
        "none" => Ok(InlineCount::None),
        _ => Err(vec![QueryIssue::InvalidInlineCount(value.to_string())]),
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim)
}

fn parse_select(value: &str) -> Result<Vec<String>, Vec<QueryIssue>> {
    if value.trim() == "*" {
        return Ok(Vec::new());
    }

    let mut fields = Vec::new();
    let mut issues = Vec::new();
    for field in split_list(value) {
        if FIELD_NAME.is_match(field) {
            fields.push(field.to_string());
        } else {
            issues.push(QueryIssue::InvalidField(field.to_string()));
        }
    }

    if issues.is_empty() {
        Ok(fields)
    } else {
        Err(issues)
    }
}

fn parse_order_by(value: &str) -> Result<Vec<OrderItem>, Vec<QueryIssue>> {
    let mut items = Vec::new();
    let mut issues = Vec::new();

    for item in split_list(value) {
        let words: Vec<&str> = item.split_whitespace().collect();
        let (field, direction) = match words.as_slice() {
            [field] => (*field, OrderDirection::Asc),
            [field, "asc"] => (*field, OrderDirection::Asc),
            [field, "desc"] => (*field, OrderDirection::Desc),
            [_, other] => {
                issues.push(QueryIssue::InvalidOrderDirection(other.to_string()));
                continue;
            }
            [] => {
                issues.push(QueryIssue::InvalidField(String::new()));
                continue;
            }
            _ => {
                issues.push(QueryIssue::TooManyOrderTerms(words.join(" ")));
                continue;
            }
        };

        if !FIELD_NAME.is_match(field) {
            issues.push(QueryIssue::InvalidField(field.to_string()));
            continue;
        }
        items.push(OrderItem {
            field: field.to_string(),
            direction,
        });
    }

    if issues.is_empty() {
        Ok(items)
    } else {
        Err(issues)
    }
}
