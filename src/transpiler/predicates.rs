//! Predicate dispatch.
//!
//! Every predicate tag has exactly one handler below. Negation is threaded as a
//! flag: `Not` flips it, combinators swap INTERSECT/UNION under it, and leaves
//! pick their join style and condition from it.

use crate::ast::{ComparisonOp, JoinKind, Path, Predicate, SetOp, Value};
use crate::error::{EavError, EavResult};
use crate::transpiler::CompileContext;
use crate::transpiler::collections::{
    compile_contains, compile_contains_all, compile_many_association_contains, complement,
    value_conditions,
};
use crate::transpiler::conditions::Condition;
use crate::transpiler::joins::{JoinTarget, resolve_path};
use crate::transpiler::query::FilterQuery;

/// Join-style class of a leaf predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Equality, ordering and regex comparisons.
    Comparison,
    /// Collection and many-association membership.
    Containment,
    IsNull,
    IsNotNull,
}

/// Join kind used to reach the slot of a leaf predicate.
///
/// Outer joins keep entities that lack the slot whenever a missing value
/// satisfies the predicate under the current polarity.
pub const fn join_kind(leaf: LeafKind, negated: bool) -> JoinKind {
    match (leaf, negated) {
        (LeafKind::Comparison | LeafKind::Containment, false) => JoinKind::Inner,
        (LeafKind::Comparison | LeafKind::Containment, true) => JoinKind::Left,
        (LeafKind::IsNull, false) => JoinKind::Left,
        (LeafKind::IsNull, true) => JoinKind::Inner,
        (LeafKind::IsNotNull, false) => JoinKind::Inner,
        (LeafKind::IsNotNull, true) => JoinKind::Left,
    }
}

/// Reduce a predicate tree to the set of matching entity PKs.
pub(crate) fn compile_predicate(
    ctx: &CompileContext<'_>,
    predicate: &Predicate,
    negated: bool,
) -> EavResult<FilterQuery> {
    match predicate {
        Predicate::And(children) => {
            let op = if negated { SetOp::Union } else { SetOp::Intersect };
            combine(ctx, children, op, negated)
        }
        Predicate::Or(children) => {
            let op = if negated { SetOp::Intersect } else { SetOp::Union };
            combine(ctx, children, op, negated)
        }
        Predicate::Not(operand) => compile_predicate(ctx, operand, !negated),
        Predicate::Comparison { op, path, value } => {
            compile_comparison(ctx, *op, path, value, negated)
        }
        Predicate::Matches { path, regex } => compile_matches(ctx, path, regex, negated),
        Predicate::Contains { path, value } => compile_contains(ctx, path, value, negated),
        Predicate::ContainsAll { path, values } => compile_contains_all(ctx, path, values, negated),
        Predicate::PropertyNull(path) => compile_null_check(ctx, path, LeafKind::IsNull, negated),
        Predicate::PropertyNotNull(path) => {
            compile_null_check(ctx, path, LeafKind::IsNotNull, negated)
        }
        Predicate::AssociationNull(path) => {
            require_association(predicate, path)?;
            compile_null_check(ctx, path, LeafKind::IsNull, negated)
        }
        Predicate::AssociationNotNull(path) => {
            require_association(predicate, path)?;
            compile_null_check(ctx, path, LeafKind::IsNotNull, negated)
        }
        Predicate::ManyAssociationContains { path, identity } => {
            compile_many_association_contains(ctx, path, identity, negated)
        }
    }
}

/// Compile children independently and join them with one set operator.
///
/// An empty INTERSECT is every entity of the result type; an empty UNION is
/// none of them.
fn combine(
    ctx: &CompileContext<'_>,
    children: &[Predicate],
    op: SetOp,
    negated: bool,
) -> EavResult<FilterQuery> {
    if children.is_empty() {
        let mut query = ctx.leaf_query();
        if op == SetOp::Union {
            query.filter(Condition::False);
        }
        return Ok(FilterQuery::select(query));
    }

    let mut operands = children
        .iter()
        .map(|child| compile_predicate(ctx, child, negated))
        .collect::<EavResult<Vec<_>>>()?;

    if operands.len() == 1 {
        return Ok(operands.remove(0));
    }
    Ok(FilterQuery::compound(op, operands))
}

fn require_association(predicate: &Predicate, path: &Path) -> EavResult<()> {
    if path.leaf().is_association() {
        Ok(())
    } else {
        Err(EavError::unsupported(
            predicate.kind(),
            format!("'{}' is not an association", path),
        ))
    }
}

fn compile_comparison(
    ctx: &CompileContext<'_>,
    op: ComparisonOp,
    path: &Path,
    value: &Value,
    negated: bool,
) -> EavResult<FilterQuery> {
    match value {
        Value::Null => match op {
            ComparisonOp::Eq => compile_null_check(ctx, path, LeafKind::IsNull, negated),
            ComparisonOp::Ne => compile_null_check(ctx, path, LeafKind::IsNotNull, negated),
            _ => Err(EavError::unsupported(
                "comparison",
                format!("'{}' against null on '{}'", op.name(), path),
            )),
        },
        Value::List(_) => Err(EavError::unsupported(
            "comparison",
            format!("collection value compared to '{}'; use contains", path),
        )),
        Value::Composite(_) => compile_composite_comparison(ctx, op, path, value, negated),
        scalar => {
            let mut query = ctx.leaf_query();
            let kind = join_kind(LeafKind::Comparison, negated);
            let column =
                resolve_path(ctx, &mut query, path, kind, JoinTarget::Entity)?.value_column(ctx);

            let condition = if negated {
                Condition::Or(vec![
                    Condition::Compare {
                        column: column.clone(),
                        op: op.negated(),
                        value: scalar.clone(),
                    },
                    Condition::IsNull(column),
                ])
            } else {
                Condition::Compare { column, op, value: scalar.clone() }
            };
            query.filter(condition);
            Ok(FilterQuery::select(query))
        }
    }
}

/// Value composites compare field by field through nested slot joins.
fn compile_composite_comparison(
    ctx: &CompileContext<'_>,
    op: ComparisonOp,
    path: &Path,
    value: &Value,
    negated: bool,
) -> EavResult<FilterQuery> {
    if !op.is_equality() {
        return Err(EavError::unsupported(
            "comparison",
            format!("'{}' is not defined for value composites", op.name()),
        ));
    }
    if path.leaf().is_association() {
        return Err(EavError::unsupported(
            "comparison",
            format!("'{}' is an association; compare it by identity", path),
        ));
    }
    if value.contains_collection() {
        return Err(EavError::unsupported(
            "comparison",
            "collections cannot be matched inside a value",
        ));
    }

    let mut query = ctx.leaf_query();
    let kind = join_kind(LeafKind::Comparison, false);
    let holder = resolve_path(ctx, &mut query, path, kind, JoinTarget::Slot)?.slot;
    let matched = value_conditions(ctx, &mut query, holder, value, 0)?;
    query.filter(matched);

    let positive = FilterQuery::select(query);
    if negated != (op == ComparisonOp::Ne) {
        Ok(complement(ctx, positive))
    } else {
        Ok(positive)
    }
}

fn compile_matches(
    ctx: &CompileContext<'_>,
    path: &Path,
    regex: &str,
    negated: bool,
) -> EavResult<FilterQuery> {
    if !ctx.generator.supports_regex() {
        return Err(EavError::unsupported(
            "matches",
            format!("the {} dialect has no regular expression operator", ctx.generator.name()),
        ));
    }

    let mut query = ctx.leaf_query();
    let kind = join_kind(LeafKind::Comparison, negated);
    let column = resolve_path(ctx, &mut query, path, kind, JoinTarget::Entity)?.value_column(ctx);

    let matched = Condition::Regex { column: column.clone(), pattern: regex.to_string() };
    let condition = if negated {
        Condition::Or(vec![Condition::Not(Box::new(matched)), Condition::IsNull(column)])
    } else {
        matched
    };
    query.filter(condition);
    Ok(FilterQuery::select(query))
}

/// Null checks test the slot value itself, so associations stop at their slot
/// table instead of joining the target entity.
fn compile_null_check(
    ctx: &CompileContext<'_>,
    path: &Path,
    leaf: LeafKind,
    negated: bool,
) -> EavResult<FilterQuery> {
    let mut query = ctx.leaf_query();
    let kind = join_kind(leaf, negated);
    let column = resolve_path(ctx, &mut query, path, kind, JoinTarget::Slot)?.value_column(ctx);

    let wants_null = (leaf == LeafKind::IsNull) != negated;
    query.filter(if wants_null {
        Condition::IsNull(column)
    } else {
        Condition::IsNotNull(column)
    });
    Ok(FilterQuery::select(query))
}
