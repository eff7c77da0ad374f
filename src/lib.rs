//! # eavql
//!
//! Compiles typed predicate trees over domain objects into SQL against an
//! entity-attribute-value layout: one entity table, one type membership
//! table and one table per property or association slot.
//!
//! ```
//! use eavql::prelude::*;
//! use eavql::ast::builders::{and, contains, gt};
//!
//! let mut schema = Schema::new();
//! schema
//!     .entity("Person", 1, &[])
//!     .add_slot(QualifiedName::new("Person", "age"), SlotInfo::new("T_AGE", 0))
//!     .add_slot(QualifiedName::new("Person", "tags"), SlotInfo::new("T_TAGS", 1));
//!
//! let age = Path::property(QualifiedName::new("Person", "age"));
//! let tags = Path::property(QualifiedName::new("Person", "tags"));
//! let request = QueryRequest::new("Person")
//!     .filter(and([gt(age, 30), contains(tags, "red")]))
//!     .limit(10);
//!
//! let compiled = Compiler::new(&schema, Dialect::Postgres).compile(&request).unwrap();
//! assert_eq!(compiled.params.len(), 2);
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod schema;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::{CompilerOptions, LayoutConfig};
    pub use crate::error::*;
    pub use crate::schema::{EntityType, Metadata, Schema, SlotInfo};
    pub use crate::transpiler::{CompiledQuery, Compiler, Dialect, SqlGenerator};
}
