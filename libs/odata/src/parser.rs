//! Shunting-Yard conversion from infix to postfix token order
//!
//! Operators and functions come from the grammar registry; every token that
//! is neither punctuation nor an operator is treated as a literal.

use crate::error::ParseError;
use crate::grammar;
use crate::token::{Token, TokenKind};

/// Reorder `tokens` into postfix (reverse Polish) order.
///
/// Parentheses and commas are consumed. Two literals may never be emitted
/// back to back, which rejects input such as `name eqs other`.
pub fn infix_to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();
    let mut was_literal = false;

    for token in tokens {
        match token.kind {
            TokenKind::Function => {
                stack.push(token);
                was_literal = false;
            }
            TokenKind::Comma => {
                // Argument separator: flush back to the enclosing "("
                loop {
                    match stack.last().map(|top| top.kind) {
                        None => {
                            return Err(ParseError::UnexpectedComma {
                                position: token.position,
                            })
                        }
                        Some(TokenKind::OpenParen) => break,
                        Some(_) => output.extend(stack.pop()),
                    }
                }
                was_literal = false;
            }
            TokenKind::LogicalOp => {
                let incoming = grammar::operator(token.symbol())
                    .ok_or_else(|| ParseError::UnknownSymbol(token.raw.clone()))?;
                while let Some(top) = stack.last() {
                    let pops = top.kind == TokenKind::LogicalOp
                        && grammar::operator(top.symbol())
                            .is_some_and(|stacked| incoming.yields_to(stacked));
                    if !pops {
                        break;
                    }
                    output.extend(stack.pop());
                }
                stack.push(token);
                was_literal = false;
            }
            TokenKind::OpenParen => {
                stack.push(token);
                was_literal = false;
            }
            TokenKind::CloseParen => {
                loop {
                    match stack.pop() {
                        None => {
                            return Err(ParseError::MismatchedParenthesis {
                                position: token.position,
                            })
                        }
                        Some(top) if top.kind == TokenKind::OpenParen => break,
                        Some(top) => output.push(top),
                    }
                }
                if stack.last().is_some_and(|top| top.kind == TokenKind::Function) {
                    output.extend(stack.pop());
                }
                was_literal = false;
            }
            _ => {
                if was_literal {
                    let first = output.last().map(|t| t.raw.clone()).unwrap_or_default();
                    return Err(ParseError::TwoLiteralsInARow {
                        first,
                        second: token.raw,
                    });
                }
                output.push(token);
                was_literal = true;
            }
        }
    }

    while let Some(top) = stack.pop() {
        if matches!(top.kind, TokenKind::OpenParen | TokenKind::CloseParen) {
            return Err(ParseError::MismatchedParenthesis {
                position: top.position,
            });
        }
        output.push(top);
    }

    tracing::trace!(
        postfix = %output.iter().map(|t| t.raw.as_str()).collect::<Vec<_>>().join(" "),
        "converted filter to postfix"
    );
    Ok(output)
}
