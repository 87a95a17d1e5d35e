//! Filter compilation tests for the MongoDB backend

use bson::oid::ObjectId;
use bson::{doc, Bson, Document, Regex};
use sieve_mongo::{compile, compile_with, filter_document, MongoOptions};
use sieve_odata::{parse_filter, CompileError, Error, ParseError};

fn mongo(filter: &str) -> Document {
    compile(&parse_filter(filter).unwrap()).unwrap_or_else(|e| panic!("{filter}: {e}"))
}

fn compile_error(filter: &str) -> CompileError {
    compile(&parse_filter(filter).unwrap()).unwrap_err()
}

fn regex(pattern: &str) -> Bson {
    Bson::RegularExpression(Regex {
        pattern: pattern.to_string(),
        options: "i".to_string(),
    })
}

#[test]
fn test_comparison_operators() {
    assert_eq!(mongo("a eq 1"), doc! { "a": { "$eq": 1_i64 } });
    assert_eq!(mongo("a ne 1"), doc! { "a": { "$ne": 1_i64 } });
    assert_eq!(mongo("a gt 1"), doc! { "a": { "$gt": 1_i64 } });
    assert_eq!(mongo("a ge 1"), doc! { "a": { "$gte": 1_i64 } });
    assert_eq!(mongo("a lt 1"), doc! { "a": { "$lt": 1_i64 } });
    assert_eq!(mongo("a le 1"), doc! { "a": { "$lte": 1_i64 } });
}

#[test]
fn test_typed_values() {
    assert_eq!(mongo("price lt 9.5"), doc! { "price": { "$lt": 9.5 } });
    assert_eq!(mongo("active eq true"), doc! { "active": { "$eq": true } });
    assert_eq!(mongo("gtin eq '123'"), doc! { "gtin": { "$eq": "123" } });
    assert_eq!(
        mongo("created ge 2020-01-02"),
        doc! { "created": { "$gte": bson::DateTime::from_millis(1_577_923_200_000) } }
    );
    assert_eq!(
        mongo("ts lt 2020-01-02T01:00:00+01:00"),
        doc! { "ts": { "$lt": bson::DateTime::from_millis(1_577_923_200_000) } }
    );
    assert_eq!(mongo("opens eq 09:30"), doc! { "opens": { "$eq": "09:30:00" } });
}

#[test]
fn test_logical_operators_nest() {
    assert_eq!(
        mongo("a eq 1 and b eq 2 or c eq 3"),
        doc! {
            "$or": [
                { "$and": [ { "a": { "$eq": 1_i64 } }, { "b": { "$eq": 2_i64 } } ] },
                { "c": { "$eq": 3_i64 } },
            ]
        }
    );
}

#[test]
fn test_string_functions() {
    assert_eq!(mongo("startswith(code, '456')"), doc! { "code": regex("^456") });
    assert_eq!(mongo("endswith(code, '456')"), doc! { "code": regex("456$") });
    assert_eq!(mongo("contains(code, '456')"), doc! { "code": regex("456") });
}

#[test]
fn test_function_pattern_is_escaped() {
    assert_eq!(
        mongo("contains(name, 'a.c+')"),
        doc! { "name": regex(r"a\.c\+") }
    );
}

#[test]
fn test_case_sensitive_option() {
    let options = MongoOptions {
        case_insensitive: false,
        ..MongoOptions::default()
    };
    let tree = parse_filter("startswith(code, 'A')").unwrap();
    assert_eq!(
        compile_with(&tree, &options).unwrap(),
        doc! { "code": Bson::RegularExpression(Regex { pattern: "^A".into(), options: String::new() }) }
    );
}

#[test]
fn test_string_values_keep_no_quotes() {
    assert_eq!(
        mongo("name eq 'O''Brien'"),
        doc! { "name": { "$eq": "O'Brien" } }
    );
}

#[test]
fn test_object_id_comparison() {
    let expected = ObjectId::parse_str("59a6fbaf22e60174f5107a9a").unwrap();
    assert_eq!(
        mongo("_id gt '59a6fbaf22e60174f5107a9a' and upc_code eq 'val'"),
        doc! {
            "$and": [
                { "_id": { "$gt": expected } },
                { "upc_code": { "$eq": "val" } },
            ]
        }
    );
}

#[test]
fn test_object_id_only_for_gt() {
    assert_eq!(
        mongo("_id eq 'abc'"),
        doc! { "_id": { "$eq": "abc" } }
    );
}

#[test]
fn test_invalid_object_id() {
    assert_eq!(
        compile_error("_id gt 'not-hex'"),
        CompileError::InvalidIdFormat("not-hex".into())
    );
    assert_eq!(
        compile_error("_id gt '59a6fbaf22e6'"),
        CompileError::InvalidIdFormat("59a6fbaf22e6".into())
    );
}

#[test]
fn test_custom_id_field() {
    let options = MongoOptions {
        id_field: "ref".into(),
        ..MongoOptions::default()
    };
    let tree = parse_filter("ref gt '59a6fbaf22e60174f5107a9a'").unwrap();
    let filter = compile_with(&tree, &options).unwrap();
    assert!(matches!(
        filter.get_document("ref").unwrap().get("$gt"),
        Some(Bson::ObjectId(_))
    ));

    let tree = parse_filter("_id gt 'plain'").unwrap();
    assert!(compile_with(&tree, &options).is_ok());
}

#[test]
fn test_literal_on_left_is_invalid_key() {
    assert_eq!(
        compile_error("0 eq epc_item_type"),
        CompileError::InvalidKey("0".into())
    );
}

#[test]
fn test_comparison_between_expressions() {
    assert!(matches!(
        compile_error("(a eq 1) eq (b eq 2)"),
        CompileError::InvalidKey(_)
    ));
}

#[test]
fn test_non_string_pattern() {
    assert_eq!(
        compile_error("contains(code, 5)"),
        CompileError::NonStringOperand {
            function: "contains",
            found: "integer"
        }
    );
}

#[test]
fn test_bare_leaf_is_not_a_filter() {
    assert_eq!(
        compile_error("name"),
        CompileError::ExpectedExpression("name".into())
    );
}

#[test]
fn test_filter_document_reports_boundary_errors() {
    let options = MongoOptions::default();
    assert!(filter_document("gtin eq '123'", &options).is_ok());
    assert!(matches!(
        filter_document("name eq 'val')", &options),
        Err(Error::Parse(_))
    ));
    let err = filter_document("_id gt 'x'", &options).unwrap_err();
    assert!(matches!(err, Error::Compile(_)));
    assert!(err.to_string().starts_with("invalid filter syntax:"));
}

#[test]
fn test_compile_is_deterministic_and_pure() {
    let tree = parse_filter("a eq 1 or startswith(b, 'x')").unwrap();
    let before = tree.clone();
    assert_eq!(compile(&tree).unwrap(), compile(&tree).unwrap());
    assert_eq!(tree, before);
}

#[test]
fn test_parallel_compilation() {
    let filters: Vec<String> = (0..16)
        .map(|i| format!("field{i} eq {i} and startswith(name, 'n{i}')"))
        .collect();
    let sequential: Vec<Document> = filters.iter().map(|f| mongo(f)).collect();

    let handles: Vec<_> = filters
        .clone()
        .into_iter()
        .map(|f| std::thread::spawn(move || mongo(&f)))
        .collect();
    let parallel: Vec<Document> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_deep_filter_is_a_filter_error() {
    let chain = |terms: usize| {
        (0..terms)
            .map(|i| format!("f{i} eq {i}"))
            .collect::<Vec<_>>()
            .join(" and ")
    };

    let err = filter_document(&chain(10_000), &MongoOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::TooDeep { .. })));
    assert!(err.to_string().starts_with("invalid filter syntax:"));

    let document = filter_document(&chain(200), &MongoOptions::default()).unwrap();
    assert!(document.contains_key("$and"));
}
