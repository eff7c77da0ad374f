//! Ergonomic builder functions for predicate trees.
//!
//! # Example
//! ```
//! use eavql::ast::builders::*;
//! use eavql::ast::{Path, QualifiedName};
//!
//! let age = Path::property(QualifiedName::new("Person", "age"));
//! let tags = Path::property(QualifiedName::new("Person", "tags"));
//! let filter = and([gt(age, 30), contains(tags, "red")]);
//! assert_eq!(filter.kind(), "and");
//! ```

use crate::ast::{ComparisonOp, Path, Predicate, Value};

fn compare(op: ComparisonOp, path: Path, value: Value) -> Predicate {
    Predicate::Comparison { op, path, value }
}

/// Create an equality predicate (path = value)
pub fn eq(path: Path, value: impl Into<Value>) -> Predicate {
    compare(ComparisonOp::Eq, path, value.into())
}

/// Create a not-equal predicate (path <> value)
pub fn ne(path: Path, value: impl Into<Value>) -> Predicate {
    compare(ComparisonOp::Ne, path, value.into())
}

/// Create a greater-than predicate (path > value)
pub fn gt(path: Path, value: impl Into<Value>) -> Predicate {
    compare(ComparisonOp::Gt, path, value.into())
}

/// Create a greater-than-or-equal predicate (path >= value)
pub fn ge(path: Path, value: impl Into<Value>) -> Predicate {
    compare(ComparisonOp::Ge, path, value.into())
}

/// Create a less-than predicate (path < value)
pub fn lt(path: Path, value: impl Into<Value>) -> Predicate {
    compare(ComparisonOp::Lt, path, value.into())
}

/// Create a less-than-or-equal predicate (path <= value)
pub fn le(path: Path, value: impl Into<Value>) -> Predicate {
    compare(ComparisonOp::Le, path, value.into())
}

/// Create a regular expression match
pub fn matches(path: Path, regex: impl Into<String>) -> Predicate {
    Predicate::Matches { path, regex: regex.into() }
}

pub fn contains(path: Path, value: impl Into<Value>) -> Predicate {
    Predicate::Contains { path, value: value.into() }
}

pub fn contains_all<V: Into<Value>>(path: Path, values: impl IntoIterator<Item = V>) -> Predicate {
    Predicate::ContainsAll {
        path,
        values: values.into_iter().map(Into::into).collect(),
    }
}

pub fn is_null(path: Path) -> Predicate {
    Predicate::PropertyNull(path)
}

pub fn is_not_null(path: Path) -> Predicate {
    Predicate::PropertyNotNull(path)
}

pub fn association_null(path: Path) -> Predicate {
    Predicate::AssociationNull(path)
}

pub fn association_not_null(path: Path) -> Predicate {
    Predicate::AssociationNotNull(path)
}

pub fn many_association_contains(path: Path, identity: impl Into<String>) -> Predicate {
    Predicate::ManyAssociationContains { path, identity: identity.into() }
}

pub fn and(children: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::And(children.into_iter().collect())
}

pub fn or(children: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::Or(children.into_iter().collect())
}

pub fn not(operand: Predicate) -> Predicate {
    Predicate::Not(Box::new(operand))
}
