//! Parse tree built from postfix tokens

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::error::ParseError;
use crate::grammar::{self, Function, Operator};
use crate::token::{LiteralValue, Token, TokenKind};

/// A node of the filter parse tree.
///
/// Only [`postfix_to_tree`] builds nodes, so every operator and function
/// node has exactly its declared number of children and those children
/// are either all expressions or all values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseNode {
    token: Token,
    children: Vec<ParseNode>,
}

/// Borrowed view of a node for exhaustive matching in the compilers
#[derive(Debug, Clone, Copy)]
pub enum NodeShape<'a> {
    Binary {
        operator: &'static Operator,
        left: &'a ParseNode,
        right: &'a ParseNode,
    },
    Call {
        function: &'static Function,
        field: &'a ParseNode,
        argument: &'a ParseNode,
    },
    Leaf(&'a Token),
}

impl ParseNode {
    fn leaf(token: Token) -> Self {
        Self {
            token,
            children: Vec::new(),
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn children(&self) -> &[ParseNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Operator or function node
    pub fn is_operator(&self) -> bool {
        self.token.kind.is_operator()
    }

    pub fn shape(&self) -> NodeShape<'_> {
        match (self.token.kind, self.children.as_slice()) {
            (TokenKind::LogicalOp, [left, right]) => match grammar::operator(self.token.symbol()) {
                Some(operator) => NodeShape::Binary {
                    operator,
                    left,
                    right,
                },
                None => NodeShape::Leaf(&self.token),
            },
            (TokenKind::Function, [field, argument]) => {
                match grammar::function(self.token.symbol()) {
                    Some(function) => NodeShape::Call {
                        function,
                        field,
                        argument,
                    },
                    None => NodeShape::Leaf(&self.token),
                }
            }
            _ => NodeShape::Leaf(&self.token),
        }
    }

    /// Field name, when this node is a bare identifier
    pub fn as_field(&self) -> Option<&str> {
        (self.is_leaf() && self.token.kind == TokenKind::Literal).then(|| self.token.symbol())
    }

    /// Value carried by a leaf. Bare identifiers read as strings.
    pub fn as_literal(&self) -> Option<&LiteralValue> {
        (self.is_leaf() && self.token.kind.is_literal()).then_some(&self.token.value)
    }
}

impl fmt::Display for ParseNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            return f.write_str(&self.token.raw);
        }
        write!(f, "({}", self.token.raw)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}

/// Deepest tree [`postfix_to_tree`] accepts, counting leaves as depth 1.
///
/// The compilers, `Display` and `Drop` all recurse over the tree.
pub const MAX_DEPTH: usize = 256;

/// Build a parse tree from postfix tokens.
pub fn postfix_to_tree(postfix: Vec<Token>) -> Result<ParseNode, ParseError> {
    let mut stack: Vec<ParseNode> = Vec::new();
    // Depth of each node on `stack`, kept in step with it
    let mut depths: Vec<usize> = Vec::new();

    for token in postfix {
        if !token.kind.is_operator() {
            stack.push(ParseNode::leaf(token));
            depths.push(1);
            continue;
        }

        let arity = grammar::arity(token.symbol())
            .ok_or_else(|| ParseError::UnknownSymbol(token.raw.clone()))?;

        // Children come off the stack last-first
        let mut children = VecDeque::with_capacity(arity);
        let mut depth = 1;
        for _ in 0..arity {
            let child = stack.pop().ok_or_else(|| ParseError::MissingOperand {
                operator: token.raw.clone(),
            })?;
            depth = depth.max(depths.pop().unwrap_or(1) + 1);
            children.push_front(child);
        }
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { limit: MAX_DEPTH });
        }

        let expressions = children.iter().filter(|c| c.is_operator()).count();
        if expressions != 0 && expressions != children.len() {
            return Err(ParseError::OperandTypeMismatch {
                operator: token.raw.clone(),
            });
        }

        stack.push(ParseNode {
            token,
            children: children.into(),
        });
        depths.push(depth);
    }

    match stack.len() {
        0 => Err(ParseError::Empty),
        1 => stack.pop().ok_or(ParseError::Empty),
        remaining => Err(ParseError::Malformed { remaining }),
    }
}
