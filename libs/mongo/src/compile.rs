//! Parse tree to MongoDB filter document

use bson::oid::ObjectId;
use bson::{doc, Bson, Document, Regex};
use chrono::NaiveTime;

use sieve_odata::grammar::{BinaryOperator, Operator, StringFunction};
use sieve_odata::{CompileError, LiteralValue, NodeShape, ParseNode};

use crate::options::MongoOptions;

/// Compile a filter tree with default options
pub fn compile(node: &ParseNode) -> Result<Document, CompileError> {
    compile_with(node, &MongoOptions::default())
}

/// Compile a filter tree into a MongoDB filter document.
///
/// The tree is only read; no state survives the call.
pub fn compile_with(node: &ParseNode, options: &MongoOptions) -> Result<Document, CompileError> {
    match node.shape() {
        NodeShape::Binary {
            operator,
            left,
            right,
        } if operator.op.is_logical() => {
            let left = compile_with(left, options)?;
            let right = compile_with(right, options)?;
            Ok(doc! { operator_key(operator.op): [left, right] })
        }
        NodeShape::Binary {
            operator,
            left,
            right,
        } => comparison(operator, left, right, options),
        NodeShape::Call {
            function,
            field,
            argument,
        } => {
            let key = field_name(field)?;
            let pattern = match argument.as_literal() {
                Some(LiteralValue::String(text)) => text,
                Some(other) => {
                    return Err(CompileError::NonStringOperand {
                        function: function.name,
                        found: other.type_name(),
                    })
                }
                None => {
                    return Err(CompileError::InvalidValue {
                        field: key.to_string(),
                    })
                }
            };
            let regex = string_regex(function.function, pattern, options.case_insensitive);
            Ok(doc! { key: Bson::RegularExpression(regex) })
        }
        NodeShape::Leaf(token) => Err(CompileError::ExpectedExpression(token.raw.clone())),
    }
}

fn comparison(
    operator: &Operator,
    left: &ParseNode,
    right: &ParseNode,
    options: &MongoOptions,
) -> Result<Document, CompileError> {
    let key = field_name(left)?;
    let value = right.as_literal().ok_or_else(|| CompileError::InvalidValue {
        field: key.to_string(),
    })?;

    let value = if operator.op == BinaryOperator::Gt && key == options.id_field {
        Bson::ObjectId(object_id(value)?)
    } else {
        to_bson(value)
    };

    Ok(doc! { key: { operator_key(operator.op): value } })
}

fn field_name(node: &ParseNode) -> Result<&str, CompileError> {
    node.as_field()
        .ok_or_else(|| CompileError::InvalidKey(node.to_string()))
}

fn operator_key(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Eq => "$eq",
        BinaryOperator::Ne => "$ne",
        BinaryOperator::Gt => "$gt",
        BinaryOperator::Ge => "$gte",
        BinaryOperator::Lt => "$lt",
        BinaryOperator::Le => "$lte",
        BinaryOperator::And => "$and",
        BinaryOperator::Or => "$or",
    }
}

/// 24 hex characters to a 12 byte object id
fn object_id(value: &LiteralValue) -> Result<ObjectId, CompileError> {
    let invalid = || CompileError::InvalidIdFormat(value.to_string());
    let text = value.as_str().ok_or_else(invalid)?;
    let bytes: [u8; 12] = hex::decode(text)
        .map_err(|_| invalid())?
        .try_into()
        .map_err(|_| invalid())?;
    Ok(ObjectId::from_bytes(bytes))
}

fn string_regex(function: StringFunction, text: &str, case_insensitive: bool) -> Regex {
    let escaped = regex::escape(text);
    let pattern = match function {
        StringFunction::StartsWith => format!("^{escaped}"),
        StringFunction::EndsWith => format!("{escaped}$"),
        StringFunction::Contains => escaped,
    };
    Regex {
        pattern,
        options: if case_insensitive { "i" } else { "" }.to_string(),
    }
}

pub(crate) fn to_bson(value: &LiteralValue) -> Bson {
    match value {
        LiteralValue::Int(i) => Bson::Int64(*i),
        LiteralValue::Float(x) => Bson::Double(*x),
        LiteralValue::Bool(b) => Bson::Boolean(*b),
        LiteralValue::String(s) => Bson::String(s.clone()),
        LiteralValue::Date(d) => Bson::DateTime(bson::DateTime::from_millis(
            d.and_time(NaiveTime::MIN).and_utc().timestamp_millis(),
        )),
        LiteralValue::DateTime(dt) => {
            Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis()))
        }
        LiteralValue::Time(_) => Bson::String(value.to_string()),
    }
}
