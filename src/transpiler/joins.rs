//! Path and join resolution.
//!
//! A [`Path`] is replayed root-to-leaf. Property hops add one slot table;
//! association hops add the slot table and then the target entity table.
//! Joins already present in the SELECT for the same source row and slot are
//! reused instead of duplicated.

use crate::ast::{JoinKind, Path, PathStep, QualifiedName};
use crate::error::{EavError, EavResult};
use crate::schema::SlotInfo;
use crate::transpiler::CompileContext;
use crate::transpiler::conditions::Condition;
use crate::transpiler::query::{ColumnRef, JoinEdge, JoinKey, SelectQuery, TableAlias};

/// How far the resolver goes when the leaf is an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinTarget {
    /// Stop at the association slot table.
    Slot,
    /// Continue to the associated entity table.
    Entity,
}

/// Aliases reached by a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Table of the leaf slot.
    pub slot: TableAlias,
    /// Entity table reached by the leaf association, when joined.
    pub target: Option<TableAlias>,
}

impl ResolvedPath {
    /// Column holding the leaf value: the target identity for joined
    /// associations, otherwise the slot value.
    pub(crate) fn value_column(&self, ctx: &CompileContext<'_>) -> ColumnRef {
        match self.target {
            Some(entity) => ColumnRef::new(entity, &ctx.layout.entity_identity_column),
            None => ColumnRef::new(self.slot, &ctx.layout.value_column),
        }
    }
}

pub(crate) fn slot_info<'c>(
    ctx: &'c CompileContext<'_>,
    name: &QualifiedName,
) -> EavResult<&'c SlotInfo> {
    ctx.metadata
        .slot(name)
        .ok_or_else(|| EavError::MissingSlotMetadata(name.clone()))
}

/// Join the slot table of `name` from a source row.
///
/// `nested` slots additionally link their parent column to the source row id.
pub(crate) fn join_slot(
    ctx: &CompileContext<'_>,
    query: &mut SelectQuery,
    source: TableAlias,
    nested: bool,
    name: &QualifiedName,
    kind: JoinKind,
) -> EavResult<TableAlias> {
    let key = JoinKey::Slot { source, name: name.clone() };
    if let Some(alias) = query.memoized(&key) {
        tracing::trace!(%source, %alias, slot = %name, "reusing join");
        return Ok(alias);
    }

    let table = slot_info(ctx, name)?.table.clone();
    let layout = ctx.layout;
    let target = query.next_alias();
    let mut on = vec![Condition::ColumnEq(
        ColumnRef::new(target, &layout.entity_pk_column),
        ColumnRef::new(source, &layout.entity_pk_column),
    )];
    if nested {
        on.push(Condition::ColumnEq(
            ColumnRef::new(target, &layout.parent_column),
            ColumnRef::new(source, &layout.qname_id_column),
        ));
    }

    Ok(query.push_join(key, JoinEdge { source, target, table, kind, on }))
}

/// Join the entity table referenced by an association slot row.
fn join_target(
    ctx: &CompileContext<'_>,
    query: &mut SelectQuery,
    slot: TableAlias,
    kind: JoinKind,
) -> TableAlias {
    let key = JoinKey::Target { slot };
    if let Some(alias) = query.memoized(&key) {
        return alias;
    }

    let layout = ctx.layout;
    let target = query.next_alias();
    let on = vec![Condition::ColumnEq(
        ColumnRef::new(target, &layout.entity_pk_column),
        ColumnRef::new(slot, &layout.value_column),
    )];
    query.push_join(
        key,
        JoinEdge { source: slot, target, table: layout.entity_table.clone(), kind, on },
    )
}

/// Emit the join chain from the root entity to the leaf of `path`.
pub(crate) fn resolve_path(
    ctx: &CompileContext<'_>,
    query: &mut SelectQuery,
    path: &Path,
    kind: JoinKind,
    leaf_target: JoinTarget,
) -> EavResult<ResolvedPath> {
    // Walk leaf-to-root onto a stack, then pop root-to-leaf.
    let mut stack: Vec<&PathStep> = path.steps().iter().rev().collect();

    let mut entity = TableAlias::ROOT;
    let mut enclosing: Option<TableAlias> = None;
    let mut resolved = ResolvedPath { slot: TableAlias::ROOT, target: None };

    while let Some(step) = stack.pop() {
        let (source, nested) = match enclosing {
            Some(row) => (row, true),
            None => (entity, false),
        };
        let slot = join_slot(ctx, query, source, nested, step.name(), kind)?;
        resolved = ResolvedPath { slot, target: None };

        match step {
            PathStep::Property(_) => enclosing = Some(slot),
            PathStep::Association(_) | PathStep::ManyAssociation(_) => {
                if !stack.is_empty() || leaf_target == JoinTarget::Entity {
                    entity = join_target(ctx, query, slot, kind);
                    enclosing = None;
                    resolved.target = Some(entity);
                }
            }
        }
    }

    Ok(resolved)
}
