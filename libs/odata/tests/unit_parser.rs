//! Unit tests for Shunting-Yard parsing and tree building

use sieve_odata::lexer::tokenize;
use sieve_odata::parser::infix_to_postfix;
use sieve_odata::tree::postfix_to_tree;
use sieve_odata::{parse_filter, BinaryOperator, Error, NodeShape, ParseError, StringFunction};

/// Helper to parse a filter and render the tree
fn tree(expr: &str) -> String {
    parse_filter(expr)
        .unwrap_or_else(|e| panic!("'{expr}' should parse: {e}"))
        .to_string()
}

fn parse_error(expr: &str) -> ParseError {
    match parse_filter(expr) {
        Err(Error::Parse(e)) => e,
        other => panic!("'{expr}' should fail to parse, got {other:?}"),
    }
}

#[test]
fn test_valid_filters() {
    let filters = [
        "name eq 'val'",
        "(name eq 'val')",
        "name eq 'val' and upc_code eq 'val'",
        "name eq 'val' or upc_code eq 'val'",
        "(name eq 'val') and (upc_code eq 'val')",
        "contains(name, 'val')",
        "startswith(name, 'val') and endswith(name, 'val')",
        "epc_item_type ne 0",
        "epc_item_type gt 0 and epc_item_type le 10",
        "_id gt '59a6fbaf22e60174f5107a9a' and upc_code eq 'val'",
        "gtin eq '123'",
        "active eq true",
        "price lt 10.5",
        "created ge 2019-01-01",
        "0 eq epc_item_type",
    ];
    for filter in filters {
        assert!(parse_filter(filter).is_ok(), "'{filter}' should parse");
    }
}

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(
        tree("a eq 1 and b eq 2 or c eq 3"),
        "(or (and (eq a 1) (eq b 2)) (eq c 3))"
    );
    assert_eq!(
        tree("a eq 1 or b eq 2 and c eq 3"),
        "(or (eq a 1) (and (eq b 2) (eq c 3)))"
    );
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(
        tree("a eq 1 and (b eq 2 or c eq 3)"),
        "(and (eq a 1) (or (eq b 2) (eq c 3)))"
    );
}

#[test]
fn test_left_associativity() {
    assert_eq!(
        tree("a eq 1 and b eq 2 and c eq 3"),
        "(and (and (eq a 1) (eq b 2)) (eq c 3))"
    );
}

#[test]
fn test_function_inside_logical() {
    assert_eq!(
        tree("startswith(code, '456') or contains(name, 'x')"),
        "(or (startswith code '456') (contains name 'x'))"
    );
}

#[test]
fn test_shape_exposes_operator_metadata() {
    let root = parse_filter("a lt 5 and startswith(code, '4')").unwrap();
    match root.shape() {
        NodeShape::Binary {
            operator,
            left,
            right,
        } => {
            assert_eq!(operator.op, BinaryOperator::And);
            match left.shape() {
                NodeShape::Binary { operator, left, .. } => {
                    assert_eq!(operator.op, BinaryOperator::Lt);
                    assert_eq!(left.as_field(), Some("a"));
                }
                other => panic!("expected comparison, got {other:?}"),
            }
            match right.shape() {
                NodeShape::Call {
                    function,
                    field,
                    argument,
                } => {
                    assert_eq!(function.function, StringFunction::StartsWith);
                    assert_eq!(field.as_field(), Some("code"));
                    assert_eq!(argument.as_literal().and_then(|v| v.as_str()), Some("4"));
                }
                other => panic!("expected call, got {other:?}"),
            }
        }
        other => panic!("expected binary node, got {other:?}"),
    }
}

#[test]
fn test_children_in_source_order() {
    let root = parse_filter("left eq 'right'").unwrap();
    let children = root.children();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].token().raw, "left");
    assert_eq!(children[1].token().raw, "'right'");
    assert!(children.iter().all(|c| c.is_leaf()));
}

#[test]
fn test_trailing_close_paren() {
    assert!(matches!(
        parse_error("name eq 'val')"),
        ParseError::MismatchedParenthesis { .. }
    ));
}

#[test]
fn test_missing_right_operand() {
    assert_eq!(
        parse_error("(name eq )"),
        ParseError::MissingOperand {
            operator: "eq".into()
        }
    );
}

#[test]
fn test_unknown_operator_word() {
    assert!(matches!(
        parse_error("(name eq hello) and (name fakeop hello)"),
        ParseError::TwoLiteralsInARow { .. }
    ));
    assert!(matches!(
        parse_error("name eqs epc_item_type"),
        ParseError::TwoLiteralsInARow { .. }
    ));
}

#[test]
fn test_mixed_operands() {
    assert_eq!(
        parse_error("epc_item_type ne 0 and name"),
        ParseError::OperandTypeMismatch {
            operator: "and".into()
        }
    );
    assert_eq!(
        parse_error("name and epc_item_type ne 0"),
        ParseError::OperandTypeMismatch {
            operator: "and".into()
        }
    );
}

#[test]
fn test_reserved_word_as_argument() {
    assert!(matches!(
        parse_error("contains(and, epc_item_type)"),
        ParseError::MissingOperand { .. }
    ));
}

#[test]
fn test_empty_filter() {
    assert_eq!(parse_error(""), ParseError::Empty);
    assert_eq!(parse_error("   "), ParseError::Empty);
}

#[test]
fn test_bare_literal_parses_as_leaf() {
    let root = parse_filter("name").unwrap();
    assert!(root.is_leaf());
    assert!(matches!(root.shape(), NodeShape::Leaf(_)));
}

#[test]
fn test_dangling_expressions() {
    let postfix = infix_to_postfix(tokenize("(a eq 1) (b eq 2)").unwrap()).unwrap();
    assert_eq!(
        postfix_to_tree(postfix),
        Err(ParseError::Malformed { remaining: 2 })
    );
}

#[test]
fn test_lex_errors_surface_as_filter_syntax() {
    let err = parse_filter("name eq @").unwrap_err();
    assert!(matches!(err, Error::Lex(_)));
    assert!(err.to_string().starts_with("invalid filter syntax:"));
}

#[test]
fn test_display_is_stable() {
    let expr = "(a ne 'x' or b ge 2019-01-01) and endswith(c, 'z')";
    assert_eq!(tree(expr), tree(expr));
    assert_eq!(
        tree(expr),
        "(and (or (ne a 'x') (ge b 2019-01-01)) (endswith c 'z'))"
    );
}

fn and_chain(terms: usize) -> String {
    (0..terms)
        .map(|i| format!("f{i} eq {i}"))
        .collect::<Vec<_>>()
        .join(" and ")
}

#[test]
fn test_long_chain_is_rejected_not_overflowed() {
    assert_eq!(
        parse_error(&and_chain(10_000)),
        ParseError::TooDeep {
            limit: sieve_odata::tree::MAX_DEPTH
        }
    );

    let nested = format!("{}a eq 1{}", "(a eq 1 and ".repeat(5_000), ")".repeat(5_000));
    assert!(matches!(parse_error(&nested), ParseError::TooDeep { .. }));
}

#[test]
fn test_chain_within_depth_limit() {
    let root = parse_filter(&and_chain(200)).unwrap();
    assert!(matches!(
        root.shape(),
        NodeShape::Binary { operator, .. } if operator.op == BinaryOperator::And
    ));
}
