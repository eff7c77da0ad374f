//! Predicate compiler and SQL generation.
//!
//! Turns a [`QueryRequest`](crate::ast::QueryRequest) into a single SQL
//! statement over the entity/slot table layout plus its bound parameters.

pub mod assembler;
pub mod collections;
pub mod conditions;
pub mod dialect;
pub mod joins;
pub mod predicates;
pub mod query;
pub mod sql;
pub mod traits;

#[cfg(test)]
mod tests;

pub use assembler::{CompiledQuery, Compiler};
pub use collections::{CollectionPath, CollectionPathPattern};
pub use dialect::Dialect;
pub use traits::{SqlGenerator, escape_identifier};

use crate::config::{CompilerOptions, LayoutConfig};
use crate::schema::Metadata;
use query::{Projection, SelectQuery};

/// Inputs shared by every handler during one compile call.
pub(crate) struct CompileContext<'a> {
    pub metadata: &'a dyn Metadata,
    pub generator: &'a dyn SqlGenerator,
    pub layout: &'a LayoutConfig,
    pub options: &'a CompilerOptions,
    /// Concrete type IDs assignable to the result type, resolved once.
    pub type_ids: Vec<i64>,
}

impl CompileContext<'_> {
    /// Fresh type-filtered SELECT of entity PKs.
    pub fn leaf_query(&self) -> SelectQuery {
        SelectQuery::new(Projection::EntityPk, self.layout, &self.type_ids)
    }
}
