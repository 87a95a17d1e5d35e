use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::Serialize;

use sieve_odata::LiteralValue;

/// Bind values for positional (`$n`) parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum BindValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
}

impl From<&LiteralValue> for BindValue {
    fn from(value: &LiteralValue) -> Self {
        match value {
            LiteralValue::Int(i) => BindValue::Integer(*i),
            LiteralValue::Float(x) => BindValue::Float(*x),
            LiteralValue::Bool(b) => BindValue::Boolean(*b),
            LiteralValue::String(s) => BindValue::Text(s.clone()),
            LiteralValue::Date(d) => BindValue::Date(*d),
            LiteralValue::Time(t) => BindValue::Time(*t),
            LiteralValue::DateTime(dt) => BindValue::DateTime(*dt),
        }
    }
}

/// Append a value and return its 1-based placeholder index.
pub(crate) fn push(binds: &mut Vec<BindValue>, value: BindValue) -> usize {
    binds.push(value);
    binds.len()
}
