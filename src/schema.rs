//! Slot and type metadata consumed by the compiler.
//!
//! The compiler only reads metadata through the [`Metadata`] trait. [`Schema`]
//! is a plain implementation that can be assembled in code or loaded from
//! JSON/TOML.
//!
//! # Example
//! ```
//! use eavql::schema::{Metadata, Schema};
//!
//! let json = r#"{
//!     "entity_types": [
//!         { "name": "Person", "id": 1 },
//!         { "name": "Employee", "id": 2, "supertypes": ["Person"] }
//!     ],
//!     "slots": [
//!         { "type_name": "Person", "member": "age", "table": "T_AGE" }
//!     ]
//! }"#;
//!
//! let schema = Schema::from_json(json).unwrap();
//! assert_eq!(schema.assignable_type_ids("Person"), vec![1, 2]);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ast::QualifiedName;
use crate::error::{EavError, EavResult};

/// Storage metadata of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    /// Table holding the slot's rows.
    pub table: String,
    /// 0 for single-valued slots, otherwise the collection nesting depth.
    #[serde(default)]
    pub collection_depth: u32,
}

impl SlotInfo {
    pub fn new(table: impl Into<String>, collection_depth: u32) -> Self {
        Self { table: table.into(), collection_depth }
    }

    pub fn is_collection(&self) -> bool {
        self.collection_depth > 0
    }
}

/// A domain type known to the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub name: String,
    /// Numeric ID stored in the type membership table.
    pub id: i64,
    /// Direct supertypes (classes or interfaces).
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Abstract types never own rows.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

/// Read-only metadata interface.
pub trait Metadata: Send + Sync {
    /// Storage metadata for a slot, if registered.
    fn slot(&self, name: &QualifiedName) -> Option<&SlotInfo>;

    /// Every type the storage layer knows about.
    fn entity_types(&self) -> &[EntityType];

    /// True if `type_name` is `target` or has it among its transitive supertypes.
    fn is_assignable(&self, type_name: &str, target: &str) -> bool {
        let mut pending = vec![type_name];
        let mut seen: Vec<&str> = Vec::new();
        while let Some(current) = pending.pop() {
            if current == target {
                return true;
            }
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);
            if let Some(ty) = self.entity_types().iter().find(|t| t.name == current) {
                pending.extend(ty.supertypes.iter().map(String::as_str));
            }
        }
        false
    }

    /// IDs of all concrete types assignable to `result_type`, in declaration order.
    fn assignable_type_ids(&self, result_type: &str) -> Vec<i64> {
        self.entity_types()
            .iter()
            .filter(|t| !t.is_abstract && self.is_assignable(&t.name, result_type))
            .map(|t| t.id)
            .collect()
    }
}

/// Serialized slot entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotDef {
    type_name: String,
    member: String,
    table: String,
    #[serde(default)]
    collection_depth: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SchemaDef {
    #[serde(default)]
    entity_types: Vec<EntityType>,
    #[serde(default)]
    slots: Vec<SlotDef>,
}

/// In-memory metadata map.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: Vec<EntityType>,
    slots: HashMap<QualifiedName, SlotInfo>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity_type(&mut self, ty: EntityType) -> &mut Self {
        self.types.push(ty);
        self
    }

    /// Register a concrete type with its direct supertypes.
    pub fn entity(&mut self, name: &str, id: i64, supertypes: &[&str]) -> &mut Self {
        self.add_entity_type(EntityType {
            name: name.to_string(),
            id,
            supertypes: supertypes.iter().map(|s| s.to_string()).collect(),
            is_abstract: false,
        })
    }

    pub fn add_slot(&mut self, name: QualifiedName, info: SlotInfo) -> &mut Self {
        self.slots.insert(name, info);
        self
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Load schema from JSON string.
    pub fn from_json(json: &str) -> EavResult<Self> {
        let def: SchemaDef = serde_json::from_str(json)?;
        Ok(Self::from_def(def))
    }

    /// Load schema from TOML string.
    pub fn from_toml(input: &str) -> EavResult<Self> {
        let def: SchemaDef = toml::from_str(input).map_err(|e| EavError::Schema(e.to_string()))?;
        Ok(Self::from_def(def))
    }

    fn from_def(def: SchemaDef) -> Self {
        let mut schema = Self::new();
        schema.types = def.entity_types;
        for slot in def.slots {
            schema.add_slot(
                QualifiedName::new(slot.type_name, slot.member),
                SlotInfo::new(slot.table, slot.collection_depth),
            );
        }
        schema
    }
}

impl Metadata for Schema {
    fn slot(&self, name: &QualifiedName) -> Option<&SlotInfo> {
        self.slots.get(name)
    }

    fn entity_types(&self) -> &[EntityType] {
        &self.types
    }
}
