//! Operator and function registry for the filter grammar
//!
//! Uses compile-time perfect hash maps (phf) so lookups need no runtime
//! initialisation and the tables can be shared freely across threads.

use phf::phf_map;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Associativity {
    Left,
    Right,
}

/// Binary operators of the filter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Eq => "eq",
            BinaryOperator::Ne => "ne",
            BinaryOperator::Gt => "gt",
            BinaryOperator::Ge => "ge",
            BinaryOperator::Lt => "lt",
            BinaryOperator::Le => "le",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }

    /// `and` / `or` combine filter expressions; the rest compare a field to a value.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// String-matching functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StringFunction {
    Contains,
    StartsWith,
    EndsWith,
}

impl StringFunction {
    pub fn name(self) -> &'static str {
        match self {
            StringFunction::Contains => "contains",
            StringFunction::StartsWith => "startswith",
            StringFunction::EndsWith => "endswith",
        }
    }
}

impl fmt::Display for StringFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operator metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    pub op: BinaryOperator,
    pub symbol: &'static str,
    pub arity: usize,
    pub associativity: Associativity,
    pub precedence: u8,
}

impl Operator {
    /// Whether `stacked`, sitting on top of the operator stack, must be
    /// popped to the output before `self` is pushed.
    pub fn yields_to(&self, stacked: &Operator) -> bool {
        match self.associativity {
            Associativity::Left => self.precedence <= stacked.precedence,
            Associativity::Right => self.precedence < stacked.precedence,
        }
    }
}

/// Function metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Function {
    pub function: StringFunction,
    pub name: &'static str,
    pub arity: usize,
}

static OPERATORS: phf::Map<&'static str, Operator> = phf_map! {
    // Relational
    "gt" => Operator { op: BinaryOperator::Gt, symbol: "gt", arity: 2, associativity: Associativity::Left, precedence: 4 },
    "ge" => Operator { op: BinaryOperator::Ge, symbol: "ge", arity: 2, associativity: Associativity::Left, precedence: 4 },
    "lt" => Operator { op: BinaryOperator::Lt, symbol: "lt", arity: 2, associativity: Associativity::Left, precedence: 4 },
    "le" => Operator { op: BinaryOperator::Le, symbol: "le", arity: 2, associativity: Associativity::Left, precedence: 4 },

    // Equality
    "eq" => Operator { op: BinaryOperator::Eq, symbol: "eq", arity: 2, associativity: Associativity::Left, precedence: 3 },
    "ne" => Operator { op: BinaryOperator::Ne, symbol: "ne", arity: 2, associativity: Associativity::Left, precedence: 3 },

    // Logical
    "and" => Operator { op: BinaryOperator::And, symbol: "and", arity: 2, associativity: Associativity::Left, precedence: 2 },
    "or" => Operator { op: BinaryOperator::Or, symbol: "or", arity: 2, associativity: Associativity::Left, precedence: 1 },
};

static FUNCTIONS: phf::Map<&'static str, Function> = phf_map! {
    "contains" => Function { function: StringFunction::Contains, name: "contains", arity: 2 },
    "startswith" => Function { function: StringFunction::StartsWith, name: "startswith", arity: 2 },
    "endswith" => Function { function: StringFunction::EndsWith, name: "endswith", arity: 2 },
};

/// Look up a binary operator by its keyword
pub fn operator(name: &str) -> Option<&'static Operator> {
    OPERATORS.get(name)
}

/// Look up a function by name
pub fn function(name: &str) -> Option<&'static Function> {
    FUNCTIONS.get(name)
}

/// Arity of an operator or function symbol
pub fn arity(name: &str) -> Option<usize> {
    operator(name)
        .map(|op| op.arity)
        .or_else(|| function(name).map(|f| f.arity))
}

/// Keywords that can never be used as field names
pub fn is_reserved(word: &str) -> bool {
    OPERATORS.contains_key(word) || FUNCTIONS.contains_key(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_lookup() {
        let gt = operator("gt").unwrap();
        assert_eq!(gt.op, BinaryOperator::Gt);
        assert_eq!(gt.precedence, 4);
        assert_eq!(gt.arity, 2);

        assert!(operator("eqs").is_none());
        assert!(operator("EQ").is_none());
    }

    #[test]
    fn test_precedence_order() {
        let rank = |s: &str| operator(s).unwrap().precedence;
        assert!(rank("lt") > rank("eq"));
        assert!(rank("eq") > rank("and"));
        assert!(rank("and") > rank("or"));
        assert_eq!(rank("eq"), rank("ne"));
    }

    #[test]
    fn test_left_associative_pops_equal_precedence() {
        let and = operator("and").unwrap();
        let or = operator("or").unwrap();
        assert!(and.yields_to(and));
        assert!(or.yields_to(and));
        assert!(!and.yields_to(or));
    }

    #[test]
    fn test_right_associative_keeps_equal_precedence() {
        let right = Operator {
            associativity: Associativity::Right,
            ..*operator("and").unwrap()
        };
        assert!(!right.yields_to(operator("and").unwrap()));
        assert!(right.yields_to(operator("eq").unwrap()));
    }

    #[test]
    fn test_function_registry() {
        for name in ["contains", "startswith", "endswith"] {
            let f = function(name).unwrap();
            assert_eq!(f.name, name);
            assert_eq!(f.arity, 2);
            assert_eq!(f.function.name(), name);
        }
        assert!(function("substringof").is_none());
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved("and"));
        assert!(is_reserved("contains"));
        assert!(!is_reserved("name"));
        assert_eq!(arity("startswith"), Some(2));
        assert_eq!(arity("name"), None);
    }
}
