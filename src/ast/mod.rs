pub mod builders;
pub mod names;
pub mod operators;
pub mod path;
pub mod predicate;
pub mod values;

pub use self::names::QualifiedName;
pub use self::operators::{ComparisonOp, JoinKind, SetOp, SortOrder};
pub use self::path::{Path, PathStep};
pub use self::predicate::{OrderBy, Predicate, QueryRequest, SortKey};
pub use self::values::{CompositeField, SqlType, Value};
