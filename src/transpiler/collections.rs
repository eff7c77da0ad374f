//! Collection membership and quantifier encoding.
//!
//! Every collection element is its own row carrying a collection path string
//! (`TOP.0`, `TOP.1.3`, ...). Membership is a path pattern match plus a value
//! match; "contains all" additionally groups by entity and counts matches.

use serde::{Deserialize, Serialize};

use crate::ast::{ComparisonOp, JoinKind, Path, PathStep, SetOp, Value};
use crate::error::{EavError, EavResult};
use crate::transpiler::CompileContext;
use crate::transpiler::conditions::Condition;
use crate::transpiler::joins::{JoinTarget, ResolvedPath, join_slot, resolve_path, slot_info};
use crate::transpiler::predicates::{LeafKind, join_kind};
use crate::transpiler::query::{ColumnRef, FilterQuery, Having, SelectQuery, TableAlias};

/// Position of a row inside a (possibly nested) collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    pub const SEPARATOR: char = '.';

    /// The collection slot itself.
    pub fn top(marker: &str) -> Self {
        Self { segments: vec![marker.to_string()] }
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join(&Self::SEPARATOR.to_string()))
    }
}

/// Any path with at least one more segment below `prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPathPattern {
    pub prefix: CollectionPath,
}

impl CollectionPathPattern {
    pub fn below(prefix: CollectionPath) -> Self {
        Self { prefix }
    }

    /// `lquery` form, e.g. `TOP.*{1,}`.
    pub fn lquery(&self) -> String {
        format!("{}{}*{{1,}}", self.prefix, CollectionPath::SEPARATOR)
    }

    /// `LIKE` form, e.g. `TOP.%`.
    pub fn like_pattern(&self) -> String {
        format!("{}{}%", self.prefix, CollectionPath::SEPARATOR)
    }
}

fn collection_column(ctx: &CompileContext<'_>, alias: TableAlias) -> ColumnRef {
    ColumnRef::new(alias, &ctx.layout.collection_path_column)
}

fn top_path(ctx: &CompileContext<'_>) -> CollectionPath {
    CollectionPath::top(&ctx.layout.top_level_marker)
}

/// Reject values that cannot be stored as a single collection element.
fn check_element(path: &Path, value: &Value) -> EavResult<()> {
    match value {
        Value::Null => Err(EavError::invalid_containment(path, "null is not a collection element")),
        v if v.contains_collection() => Err(EavError::invalid_containment(
            path,
            "nested collections cannot be used as containment values",
        )),
        _ => Ok(()),
    }
}

/// Resolve the rows of the collection or many-association at `path`.
///
/// With `targets`, many-association elements additionally join their target
/// entity. The `TOP` marker row references no entity and needs `targets` off.
fn element_rows(
    ctx: &CompileContext<'_>,
    query: &mut SelectQuery,
    path: &Path,
    targets: bool,
) -> EavResult<ResolvedPath> {
    let leaf = path.leaf();
    let target = match leaf {
        PathStep::Property(name) if slot_info(ctx, name)?.is_collection() => JoinTarget::Slot,
        PathStep::ManyAssociation(_) if targets => JoinTarget::Entity,
        PathStep::ManyAssociation(_) => JoinTarget::Slot,
        _ => return Err(EavError::NotACollection(leaf.name().clone())),
    };
    let kind = join_kind(LeafKind::Containment, false);
    resolve_path(ctx, query, path, kind, target)
}

/// Condition selecting the element rows equal to `value`.
fn element_matches(
    ctx: &CompileContext<'_>,
    query: &mut SelectQuery,
    elements: &ResolvedPath,
    path: &Path,
    value: &Value,
) -> EavResult<Condition> {
    match (elements.target, value) {
        (Some(_), Value::String(_)) => Ok(Condition::Compare {
            column: elements.value_column(ctx),
            op: ComparisonOp::Eq,
            value: value.clone(),
        }),
        (Some(_), _) => Err(EavError::invalid_containment(
            path,
            "many-association elements are matched by entity identity",
        )),
        (None, _) => value_conditions(ctx, query, elements.slot, value, 0),
    }
}

/// Conditions matching `value` against the row at `holder`, descending into
/// value composites one nested slot join per property.
pub(crate) fn value_conditions(
    ctx: &CompileContext<'_>,
    query: &mut SelectQuery,
    holder: TableAlias,
    value: &Value,
    depth: usize,
) -> EavResult<Condition> {
    let max = ctx.options.max_value_depth;
    if depth > max {
        return Err(EavError::NestingTooDeep { max });
    }

    let column = ColumnRef::new(holder, &ctx.layout.value_column);
    match value {
        Value::Null => Ok(Condition::IsNull(column)),
        Value::Composite(fields) => {
            let mut conditions = Vec::with_capacity(fields.len());
            for field in fields {
                // Outer joins so partially specified composites still line up
                // when several alternatives share the joins.
                let nested = join_slot(ctx, query, holder, true, &field.name, JoinKind::Left)?;
                conditions.push(value_conditions(ctx, query, nested, &field.value, depth + 1)?);
            }
            Ok(Condition::and(conditions))
        }
        Value::List(_) => Err(EavError::unsupported(
            "value",
            "collections cannot be matched inside a value",
        )),
        scalar => Ok(Condition::Compare {
            column,
            op: ComparisonOp::Eq,
            value: scalar.clone(),
        }),
    }
}

/// Every entity of the requested types.
pub(crate) fn universe(ctx: &CompileContext<'_>) -> SelectQuery {
    ctx.leaf_query()
}

/// `universe EXCEPT positive`
pub(crate) fn complement(ctx: &CompileContext<'_>, positive: FilterQuery) -> FilterQuery {
    FilterQuery::compound(SetOp::Except, vec![FilterQuery::select(universe(ctx)), positive])
}

/// Contains (single value).
pub(crate) fn compile_contains(
    ctx: &CompileContext<'_>,
    path: &Path,
    value: &Value,
    negated: bool,
) -> EavResult<FilterQuery> {
    check_element(path, value)?;

    let mut query = ctx.leaf_query();
    let elements = element_rows(ctx, &mut query, path, true)?;
    query.filter(Condition::PathMatches {
        column: collection_column(ctx, elements.slot),
        pattern: CollectionPathPattern::below(top_path(ctx)),
    });
    let matched = element_matches(ctx, &mut query, &elements, path, value)?;
    query.filter(matched);

    let positive = FilterQuery::select(query);
    Ok(if negated { complement(ctx, positive) } else { positive })
}

/// ContainsAll: one matching element row per requested value.
pub(crate) fn compile_contains_all(
    ctx: &CompileContext<'_>,
    path: &Path,
    values: &[Value],
    negated: bool,
) -> EavResult<FilterQuery> {
    for value in values {
        check_element(path, value)?;
    }

    let mut query = ctx.leaf_query();
    let elements = element_rows(ctx, &mut query, path, !values.is_empty())?;

    if values.is_empty() {
        // Only the collection itself is required to exist.
        query.filter(Condition::PathEquals {
            column: collection_column(ctx, elements.slot),
            path: top_path(ctx),
        });
    } else {
        query.filter(Condition::PathMatches {
            column: collection_column(ctx, elements.slot),
            pattern: CollectionPathPattern::below(top_path(ctx)),
        });
        let mut alternatives = Vec::with_capacity(values.len());
        for value in values {
            alternatives.push(element_matches(ctx, &mut query, &elements, path, value)?);
        }
        query.filter(Condition::or(alternatives));

        let scalar_elements = values.iter().all(|v| !matches!(v, Value::Composite(_)));
        let column = if scalar_elements {
            elements.value_column(ctx)
        } else {
            collection_column(ctx, elements.slot)
        };
        query.having = Some(Having { column, min: values.len() });
    }

    let positive = FilterQuery::select(query);
    Ok(if negated { complement(ctx, positive) } else { positive })
}

/// ManyAssociationContains: the association references the given identity.
pub(crate) fn compile_many_association_contains(
    ctx: &CompileContext<'_>,
    path: &Path,
    identity: &str,
    negated: bool,
) -> EavResult<FilterQuery> {
    let leaf = path.leaf();
    if !matches!(leaf, PathStep::ManyAssociation(_)) {
        return Err(EavError::NotACollection(leaf.name().clone()));
    }
    compile_contains(ctx, path, &Value::String(identity.to_string()), negated)
}
