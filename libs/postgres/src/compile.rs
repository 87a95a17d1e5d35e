//! Parse tree to a PostgreSQL `WHERE` fragment over a JSONB column

use serde::Serialize;

use sieve_odata::grammar::{BinaryOperator, StringFunction};
use sieve_odata::{CompileError, LiteralValue, NodeShape, ParseNode};

use crate::bind::{self, BindValue};
use crate::options::{ParameterStyle, SqlOptions};
use crate::quote::{escape_like_pattern, quote_identifier, quote_literal};

/// SQL text plus the values for its `$n` placeholders, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlFragment {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// Compile with bound parameters against `data_column`
pub fn compile(node: &ParseNode, data_column: &str) -> Result<SqlFragment, CompileError> {
    let options = SqlOptions {
        data_column: data_column.to_string(),
        ..SqlOptions::default()
    };
    compile_with(node, &options)
}

pub fn compile_with(node: &ParseNode, options: &SqlOptions) -> Result<SqlFragment, CompileError> {
    let mut binds = Vec::new();
    let sql = compile_into(node, options, &mut binds)?;
    tracing::debug!(sql = %sql, binds = binds.len(), "compiled sql filter");
    Ok(SqlFragment { sql, binds })
}

/// Render `node`, appending bind values to `binds` so placeholder numbers
/// continue from whatever is already there.
pub(crate) fn compile_into(
    node: &ParseNode,
    options: &SqlOptions,
    binds: &mut Vec<BindValue>,
) -> Result<String, CompileError> {
    match node.shape() {
        NodeShape::Binary {
            operator,
            left,
            right,
        } if operator.op.is_logical() => {
            let keyword = if operator.op == BinaryOperator::And {
                "AND"
            } else {
                "OR"
            };
            let left = compile_into(left, options, binds)?;
            let right = compile_into(right, options, binds)?;
            Ok(format!("({left} {keyword} {right})"))
        }
        NodeShape::Binary {
            operator,
            left,
            right,
        } => {
            let key = field_name(left)?;
            let value = right.as_literal().ok_or_else(|| CompileError::InvalidValue {
                field: key.to_string(),
            })?;
            let op = comparison_operator(operator.op)?;

            let rhs = render_value(value, options, binds);
            match jsonb_type_for(value) {
                Some(sql_type) => Ok(format!(
                    "{} {op} to_jsonb({rhs}::{sql_type})",
                    json_value(&options.data_column, key)
                )),
                None => Ok(format!(
                    "{} {op} {rhs}",
                    json_text(&options.data_column, key)
                )),
            }
        }
        NodeShape::Call {
            function,
            field,
            argument,
        } => {
            let key = field_name(field)?;
            let text = match argument.as_literal() {
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

            let escaped = escape_like_pattern(text);
            let pattern = match function.function {
                StringFunction::StartsWith => format!("{escaped}%"),
                StringFunction::EndsWith => format!("%{escaped}"),
                StringFunction::Contains => format!("%{escaped}%"),
            };
            let like = if options.case_insensitive {
                "ILIKE"
            } else {
                "LIKE"
            };
            let rhs = render_value(&LiteralValue::String(pattern), options, binds);
            Ok(format!(
                "{} {like} {rhs}",
                json_text(&options.data_column, key)
            ))
        }
        NodeShape::Leaf(token) => Err(CompileError::ExpectedExpression(token.raw.clone())),
    }
}

fn field_name(node: &ParseNode) -> Result<&str, CompileError> {
    node.as_field()
        .ok_or_else(|| CompileError::InvalidKey(node.to_string()))
}

fn comparison_operator(op: BinaryOperator) -> Result<&'static str, CompileError> {
    match op {
        BinaryOperator::Eq => Ok("="),
        BinaryOperator::Ne => Ok("<>"),
        BinaryOperator::Gt => Ok(">"),
        BinaryOperator::Ge => Ok(">="),
        BinaryOperator::Lt => Ok("<"),
        BinaryOperator::Le => Ok("<="),
        BinaryOperator::And | BinaryOperator::Or => {
            Err(CompileError::UnsupportedOperator(op.symbol().to_string()))
        }
    }
}

/// `"column" ->> 'key'`
pub(crate) fn json_text(column: &str, key: &str) -> String {
    format!("{} ->> {}", quote_identifier(column), quote_literal(key))
}

/// `"column" -> 'key'`
fn json_value(column: &str, key: &str) -> String {
    format!("{} -> {}", quote_identifier(column), quote_literal(key))
}

/// SQL type a typed literal is converted through before `to_jsonb`.
///
/// Typed values compare as jsonb, so a stored value of another JSON type
/// orders by type instead of failing a text cast.
fn jsonb_type_for(value: &LiteralValue) -> Option<&'static str> {
    match value {
        LiteralValue::Int(_) | LiteralValue::Float(_) => Some("numeric"),
        LiteralValue::Bool(_) => Some("boolean"),
        LiteralValue::Date(_) => Some("date"),
        LiteralValue::Time(_) => Some("time"),
        LiteralValue::DateTime(_) => Some("timestamptz"),
        LiteralValue::String(_) => None,
    }
}

fn render_value(
    value: &LiteralValue,
    options: &SqlOptions,
    binds: &mut Vec<BindValue>,
) -> String {
    match options.parameter_style {
        ParameterStyle::Bind => format!("${}", bind::push(binds, value.into())),
        ParameterStyle::Inline => match value {
            LiteralValue::Int(i) => i.to_string(),
            LiteralValue::Float(x) => x.to_string(),
            LiteralValue::Bool(b) => b.to_string(),
            _ => quote_literal(&value.to_string()),
        },
    }
}
