//! Core compiler tests (type filter, comparisons, combinators, outer query).

use pretty_assertions::assert_eq;

use super::*;
use crate::ast::builders::*;
use crate::ast::{OrderBy, QueryRequest, SortOrder, SqlType, Value};
use crate::error::EavError;
use crate::transpiler::{Compiler, Dialect};

fn compile(request: QueryRequest) -> String {
    let schema = fixture();
    Compiler::new(&schema, Dialect::Postgres)
        .compile(&request)
        .unwrap()
        .sql
}

#[test]
fn test_match_all_filters_by_assignable_types() {
    assert_eq!(compile(QueryRequest::new("Person")), OUTER);
    assert_eq!(
        compile(QueryRequest::new("Employee")),
        "SELECT DISTINCT t0.entity_pk, t0.entity_identity FROM entities t0 JOIN entity_types ty ON ty.entity_pk = t0.entity_pk WHERE ty.entity_type_id IN (2)"
    );
}

#[test]
fn test_unknown_result_type() {
    let schema = fixture();
    let err = Compiler::new(&schema, Dialect::Postgres)
        .compile(&QueryRequest::new("Spaceship"))
        .unwrap_err();
    assert!(matches!(err, EavError::UnknownResultType(ref t) if t == "Spaceship"));
}

#[test]
fn test_simple_comparison() {
    let schema = fixture();
    let compiled = Compiler::new(&schema, Dialect::Postgres)
        .compile(&QueryRequest::new("Person").filter(gt(age(), 30)))
        .unwrap();
    assert_eq!(
        compiled.sql,
        format!(
            "{OUTER} AND t0.entity_pk IN ({LEAF} JOIN T_AGE t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value > $1)"
        )
    );
    assert_eq!(compiled.params, vec![Value::Int(30)]);
    assert_eq!(compiled.param_types, vec![SqlType::BigInt]);
}

#[test]
fn test_negated_comparison_uses_outer_join() {
    let sql = compile(QueryRequest::new("Person").filter(not(gt(age(), 30))));
    assert_eq!(
        sql,
        format!(
            "{OUTER} AND t0.entity_pk IN ({LEAF} LEFT JOIN T_AGE t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND (t1.value <= $1 OR t1.value IS NULL))"
        )
    );
}

#[test]
fn test_double_negation_compiles_like_operand() {
    let plain = compile(QueryRequest::new("Person").filter(eq(name(), "Bob")));
    let doubled = compile(QueryRequest::new("Person").filter(not(not(eq(name(), "Bob")))));
    assert_eq!(plain, doubled);
}

#[test]
fn test_and_becomes_intersect() {
    let schema = fixture();
    let compiled = Compiler::new(&schema, Dialect::Postgres)
        .compile(&QueryRequest::new("Person").filter(and([gt(age(), 30), eq(name(), "Bob")])))
        .unwrap();
    assert_eq!(
        compiled.sql,
        format!(
            "{OUTER} AND t0.entity_pk IN ({LEAF} JOIN T_AGE t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value > $1 INTERSECT {LEAF} JOIN T_NAME t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value = $2)"
        )
    );
    assert_eq!(compiled.params, vec![Value::Int(30), Value::String("Bob".into())]);
}

#[test]
fn test_negated_or_swaps_to_intersect() {
    let sql = compile(
        QueryRequest::new("Person").filter(not(or([gt(age(), 30), eq(name(), "Bob")]))),
    );
    assert_eq!(
        sql,
        format!(
            "{OUTER} AND t0.entity_pk IN ({LEAF} LEFT JOIN T_AGE t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND (t1.value <= $1 OR t1.value IS NULL) INTERSECT {LEAF} LEFT JOIN T_NAME t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND (t1.value <> $2 OR t1.value IS NULL))"
        )
    );
}

#[test]
fn test_nested_compound_is_wrapped() {
    let sql = compile(
        QueryRequest::new("Person")
            .filter(or([and([gt(age(), 30), eq(name(), "Bob")]), lt(age(), 10)])),
    );
    assert_eq!(
        sql,
        format!(
            "{OUTER} AND t0.entity_pk IN (SELECT sq.entity_pk FROM ({LEAF} JOIN T_AGE t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value > $1 INTERSECT {LEAF} JOIN T_NAME t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value = $2) AS sq UNION {LEAF} JOIN T_AGE t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value < $3)"
        )
    );
}

#[test]
fn test_same_operator_nesting_is_flattened() {
    let a = || gt(age(), 30);
    let b = || eq(name(), "Bob");
    let c = || lt(age(), 60);
    let left = compile(QueryRequest::new("Person").filter(and([a(), and([b(), c()])])));
    let right = compile(QueryRequest::new("Person").filter(and([and([a(), b()]), c()])));
    assert_eq!(left, right);
    assert!(!left.contains(" AS sq"));
}

#[test]
fn test_empty_combinators() {
    let all = compile(QueryRequest::new("Person").filter(and([])));
    assert_eq!(all, format!("{OUTER} AND t0.entity_pk IN ({LEAF} {PERSON_TYPES})"));

    let none = compile(QueryRequest::new("Person").filter(or([])));
    assert_eq!(none, format!("{OUTER} AND t0.entity_pk IN ({LEAF} {PERSON_TYPES} AND false)"));

    // Negation swaps the identities.
    let negated = compile(QueryRequest::new("Person").filter(not(and([]))));
    assert_eq!(negated, none);
}

#[test]
fn test_single_child_is_not_compounded() {
    let single = compile(QueryRequest::new("Person").filter(and([gt(age(), 30)])));
    let plain = compile(QueryRequest::new("Person").filter(gt(age(), 30)));
    assert_eq!(single, plain);
}

#[test]
fn test_null_comparisons() {
    let null_sql = compile(QueryRequest::new("Person").filter(eq(name(), Value::Null)));
    assert_eq!(
        null_sql,
        format!(
            "{OUTER} AND t0.entity_pk IN ({LEAF} LEFT JOIN T_NAME t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value IS NULL)"
        )
    );
    assert_eq!(null_sql, compile(QueryRequest::new("Person").filter(is_null(name()))));

    let not_null_sql = compile(QueryRequest::new("Person").filter(ne(name(), Value::Null)));
    assert_eq!(
        not_null_sql,
        format!(
            "{OUTER} AND t0.entity_pk IN ({LEAF} JOIN T_NAME t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value IS NOT NULL)"
        )
    );

    // NOT IS NULL matches IS NOT NULL join style and condition.
    assert_eq!(not_null_sql, compile(QueryRequest::new("Person").filter(not(is_null(name())))));
}

#[test]
fn test_ordering_against_null_is_unsupported() {
    let schema = fixture();
    let err = Compiler::new(&schema, Dialect::Postgres)
        .compile(&QueryRequest::new("Person").filter(gt(age(), Value::Null)))
        .unwrap_err();
    assert!(matches!(err, EavError::UnsupportedPredicate { predicate: "comparison", .. }));
}

#[test]
fn test_list_comparison_is_unsupported() {
    let schema = fixture();
    let err = Compiler::new(&schema, Dialect::Postgres)
        .compile(&QueryRequest::new("Person").filter(eq(tags(), vec!["red"])))
        .unwrap_err();
    assert!(matches!(err, EavError::UnsupportedPredicate { .. }));
}

#[test]
fn test_missing_slot_metadata() {
    let schema = fixture();
    let height = Path::property(qn("Person", "height"));
    let err = Compiler::new(&schema, Dialect::Postgres)
        .compile(&QueryRequest::new("Person").filter(gt(height, 180)))
        .unwrap_err();
    assert_eq!(err.to_string(), "No slot metadata registered for 'Person:height'");
}

#[test]
fn test_count_mode() {
    let sql = compile(
        QueryRequest::new("Person")
            .filter(gt(age(), 30))
            .order_by(OrderBy::asc(name()))
            .limit(10)
            .count(),
    );
    assert_eq!(
        sql,
        format!(
            "SELECT COUNT(DISTINCT t0.entity_pk) FROM entities t0 JOIN entity_types ty ON ty.entity_pk = t0.entity_pk {PERSON_TYPES} AND t0.entity_pk IN ({LEAF} JOIN T_AGE t1 ON t1.entity_pk = t0.entity_pk {PERSON_TYPES} AND t1.value > $1)"
        )
    );
}

#[test]
fn test_order_by_property_with_pagination() {
    let sql = compile(
        QueryRequest::new("Person")
            .order_by(OrderBy::asc(name()))
            .offset(20)
            .limit(10),
    );
    assert_eq!(
        sql,
        "SELECT DISTINCT t0.entity_pk, t0.entity_identity, t1.value FROM entities t0 JOIN entity_types ty ON ty.entity_pk = t0.entity_pk LEFT JOIN T_NAME t1 ON t1.entity_pk = t0.entity_pk WHERE ty.entity_type_id IN (1, 2) ORDER BY t1.value ASC, t0.entity_pk ASC LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_order_by_identity() {
    let sql = compile(QueryRequest::new("Person").order_by(OrderBy::identity(SortOrder::Desc)));
    assert_eq!(
        sql,
        format!("{OUTER} ORDER BY t0.entity_identity DESC, t0.entity_pk ASC")
    );
}

#[test]
fn test_pagination_alone_adds_tie_breaker() {
    let sql = compile(QueryRequest::new("Person").limit(5));
    assert_eq!(sql, format!("{OUTER} ORDER BY t0.entity_pk ASC LIMIT 5"));
}

#[test]
fn test_order_by_collection_is_unsupported() {
    let schema = fixture();
    let err = Compiler::new(&schema, Dialect::Postgres)
        .compile(&QueryRequest::new("Person").order_by(OrderBy::asc(tags())))
        .unwrap_err();
    assert!(matches!(err, EavError::UnsupportedPredicate { predicate: "order_by", .. }));
}

#[test]
fn test_compile_into_appends_only_on_success() {
    let schema = fixture();
    let compiler = Compiler::new(&schema, Dialect::Postgres);
    let mut values = vec![Value::String("existing".into())];
    let mut types = vec![SqlType::Varchar];

    let failed = compiler.compile_into(
        &QueryRequest::new("Person").filter(and([gt(age(), 30), contains(age(), 1)])),
        &mut values,
        &mut types,
    );
    assert!(matches!(failed, Err(EavError::NotACollection(_))));
    assert_eq!(values.len(), 1);
    assert_eq!(types.len(), 1);

    let sql = compiler
        .compile_into(&QueryRequest::new("Person").filter(gt(age(), 30)), &mut values, &mut types)
        .unwrap();
    assert!(sql.ends_with("t1.value > $1)"));
    assert_eq!(values, vec![Value::String("existing".into()), Value::Int(30)]);
    assert_eq!(types, vec![SqlType::Varchar, SqlType::BigInt]);
}

#[test]
fn test_custom_layout() {
    let schema = fixture();
    let layout = crate::config::LayoutConfig::builder()
        .entity_table("qi_entity", "pk", "identity")
        .type_table("qi_entity_type", "type_id")
        .value_column("qname_value")
        .build();
    let sql = Compiler::new(&schema, Dialect::Postgres)
        .with_layout(layout)
        .compile(&QueryRequest::new("Person").filter(gt(age(), 30)))
        .unwrap()
        .sql;
    assert_eq!(
        sql,
        "SELECT DISTINCT t0.pk, t0.identity FROM qi_entity t0 JOIN qi_entity_type ty ON ty.pk = t0.pk WHERE ty.type_id IN (1, 2) AND t0.pk IN (SELECT t0.pk FROM qi_entity t0 JOIN qi_entity_type ty ON ty.pk = t0.pk JOIN T_AGE t1 ON t1.pk = t0.pk WHERE ty.type_id IN (1, 2) AND t1.qname_value > $1)"
    );
}
