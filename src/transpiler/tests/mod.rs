//! Transpiler test modules.
//!
//! Tests are organized by category:
//! - `core`: type filter, comparisons, combinators, outer query
//! - `joins`: association hops, nested properties, join styles
//! - `collections`: contains, contains-all, many-associations
//! - `dialects`: Postgres, MySQL, SQLite rendering differences

mod core;
mod dialects;

use crate::ast::{Path, QualifiedName};
use crate::schema::{Schema, SlotInfo};

pub(super) fn qn(type_name: &str, member: &str) -> QualifiedName {
    QualifiedName::new(type_name, member)
}

/// Person(1) <- Employee(2), Company(3).
pub(super) fn fixture() -> Schema {
    let mut schema = Schema::new();
    schema
        .entity("Person", 1, &[])
        .entity("Employee", 2, &["Person"])
        .entity("Company", 3, &[])
        .add_slot(qn("Person", "age"), SlotInfo::new("T_AGE", 0))
        .add_slot(qn("Person", "name"), SlotInfo::new("T_NAME", 0))
        .add_slot(qn("Person", "tags"), SlotInfo::new("T_TAGS", 1))
        .add_slot(qn("Person", "address"), SlotInfo::new("T_ADDRESS", 0))
        .add_slot(qn("Person", "addresses"), SlotInfo::new("T_ADDRESSES", 1))
        .add_slot(qn("Address", "city"), SlotInfo::new("T_CITY", 0))
        .add_slot(qn("Address", "zip"), SlotInfo::new("T_ZIP", 0))
        .add_slot(qn("Person", "employer"), SlotInfo::new("T_EMPLOYER", 0))
        .add_slot(qn("Person", "friends"), SlotInfo::new("T_FRIENDS", 1))
        .add_slot(qn("Company", "name"), SlotInfo::new("T_COMPANY_NAME", 0));
    schema
}

pub(super) fn age() -> Path {
    Path::property(qn("Person", "age"))
}

pub(super) fn name() -> Path {
    Path::property(qn("Person", "name"))
}

pub(super) fn tags() -> Path {
    Path::property(qn("Person", "tags"))
}

pub(super) fn address() -> Path {
    Path::property(qn("Person", "address"))
}

pub(super) fn addresses() -> Path {
    Path::property(qn("Person", "addresses"))
}

pub(super) fn employer() -> Path {
    Path::association(qn("Person", "employer"))
}

pub(super) fn friends() -> Path {
    Path::many_association(qn("Person", "friends"))
}

/// Leaf SELECT prefix shared by every filter operand.
pub(super) const LEAF: &str =
    "SELECT t0.entity_pk FROM entities t0 JOIN entity_types ty ON ty.entity_pk = t0.entity_pk";

/// Outer SELECT prefix for `Person` without sort columns.
pub(super) const OUTER: &str = "SELECT DISTINCT t0.entity_pk, t0.entity_identity FROM entities t0 JOIN entity_types ty ON ty.entity_pk = t0.entity_pk WHERE ty.entity_type_id IN (1, 2)";

pub(super) const PERSON_TYPES: &str = "WHERE ty.entity_type_id IN (1, 2)";
