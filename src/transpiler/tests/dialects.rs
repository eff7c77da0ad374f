//! SQL Dialect tests (Postgres, MySQL, SQLite)

use super::*;
use crate::ast::builders::*;
use crate::ast::{OrderBy, QueryRequest, Value};
use crate::error::EavError;
use crate::transpiler::{Compiler, Dialect};

#[test]
fn test_sqlite_scalar_comparison() {
    let schema = fixture();
    let compiled = Compiler::new(&schema, Dialect::SQLite)
        .compile(&QueryRequest::new("Person").filter(gt(age(), 30)))
        .unwrap();
    assert_eq!(
        compiled.sql,
        format!(
            "{OUTER} AND t0.entity_pk IN ({LEAF} JOIN T_AGE t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value > ?)"
        )
    );
    assert_eq!(compiled.params, vec![Value::Int(30)]);
}

#[test]
fn test_mysql_dialect() {
    let schema = fixture();
    let compiled = Compiler::new(&schema, Dialect::MySQL)
        .compile(
            &QueryRequest::new("Person").filter(or([eq(name(), "Bob"), matches(name(), "^A")])),
        )
        .unwrap();
    assert!(compiled.sql.contains("t1.value = ? UNION "));
    assert!(compiled.sql.ends_with("t1.value REGEXP ?)"));
    assert_eq!(
        compiled.params,
        vec![Value::String("Bob".into()), Value::String("^A".into())]
    );
}

#[test]
fn test_mysql_quotes_reserved_names() {
    let mut schema = fixture();
    schema.add_slot(qn("Person", "order"), crate::schema::SlotInfo::new("order", 0));
    let sql = Compiler::new(&schema, Dialect::MySQL)
        .compile(&QueryRequest::new("Person").filter(eq(Path::property(qn("Person", "order")), 1)))
        .unwrap()
        .sql;
    assert!(sql.contains("JOIN `order` t1 ON"));
}

#[test]
fn test_postgres_regex() {
    let schema = fixture();
    let sql = Compiler::new(&schema, Dialect::Postgres)
        .compile(&QueryRequest::new("Person").filter(not(matches(name(), "^A"))))
        .unwrap()
        .sql;
    assert!(sql.ends_with("(NOT (t1.value ~ $1) OR t1.value IS NULL))"));
    assert!(sql.contains("LEFT JOIN T_NAME t1"));
}

#[test]
fn test_sqlite_rejects_regex() {
    let schema = fixture();
    let err = Compiler::new(&schema, Dialect::SQLite)
        .compile(&QueryRequest::new("Person").filter(matches(name(), "^A")))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unsupported predicate 'matches': the sqlite dialect has no regular expression operator"
    );
}

#[test]
fn test_offset_without_limit() {
    let schema = fixture();
    let request = QueryRequest::new("Person").order_by(OrderBy::asc(name())).offset(5);

    let sqlite = Compiler::new(&schema, Dialect::SQLite).compile(&request).unwrap().sql;
    assert!(sqlite.ends_with("LIMIT -1 OFFSET 5"));

    let mysql = Compiler::new(&schema, Dialect::MySQL).compile(&request).unwrap().sql;
    assert!(mysql.ends_with("LIMIT 18446744073709551615 OFFSET 5"));

    let postgres = Compiler::new(&schema, Dialect::Postgres).compile(&request).unwrap().sql;
    assert!(postgres.ends_with("t0.entity_pk ASC OFFSET 5"));
}

#[test]
fn test_empty_union_uses_dialect_boolean() {
    let schema = fixture();
    let sql = Compiler::new(&schema, Dialect::SQLite)
        .compile(&QueryRequest::new("Person").filter(or([])))
        .unwrap()
        .sql;
    assert!(sql.ends_with("IN (1, 2) AND 0)"));
}

#[test]
fn test_custom_generator() {
    struct Shouting;

    impl crate::transpiler::SqlGenerator for Shouting {
        fn name(&self) -> &'static str {
            "shouting"
        }
        fn quote_identifier(&self, name: &str) -> String {
            name.to_uppercase()
        }
        fn placeholder(&self, index: usize) -> String {
            format!(":p{}", index)
        }
        fn bool_literal(&self, val: bool) -> String {
            val.to_string()
        }
        fn limit_offset(&self, _limit: Option<usize>, _offset: Option<usize>) -> String {
            String::new()
        }
    }

    let schema = fixture();
    let sql = Compiler::with_generator(&schema, Box::new(Shouting))
        .compile(&QueryRequest::new("Person").filter(matches(name(), "x")))
        .unwrap()
        .sql;
    assert!(sql.ends_with("t1.VALUE REGEXP :p1)"));
    assert!(sql.starts_with("SELECT DISTINCT t0.ENTITY_PK, t0.ENTITY_IDENTITY FROM ENTITIES t0"));
}

#[test]
fn test_compile_error_is_not_dialect_specific() {
    let schema = fixture();
    for dialect in [Dialect::Postgres, Dialect::MySQL, Dialect::SQLite] {
        let err = Compiler::new(&schema, dialect)
            .compile(&QueryRequest::new("Person").filter(contains(age(), 1)))
            .unwrap_err();
        assert!(matches!(err, EavError::NotACollection(_)));
    }
}
