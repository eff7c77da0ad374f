//! Storage layout and compiler configuration

use serde::Deserialize;

use crate::error::EavResult;

/// Names of the tables and columns the compiled SQL targets.
///
/// Every per-slot table shares the same column names; only the table name
/// comes from slot metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Root entity table
    pub entity_table: String,
    /// Internal primary key, present on every table
    pub entity_pk_column: String,
    /// Public identity string on the entity table
    pub entity_identity_column: String,

    /// Entity PK -> numeric type ID membership table
    pub type_table: String,
    pub type_id_column: String,

    /// Row id of a slot value, referenced by nested rows
    pub qname_id_column: String,
    /// Link from a nested slot row to its parent row
    pub parent_column: String,
    /// Collection path string of a slot row
    pub collection_path_column: String,
    /// Stored value; for associations the target entity PK
    pub value_column: String,

    /// Root segment of every collection path
    pub top_level_marker: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            entity_table: "entities".to_string(),
            entity_pk_column: "entity_pk".to_string(),
            entity_identity_column: "entity_identity".to_string(),
            type_table: "entity_types".to_string(),
            type_id_column: "entity_type_id".to_string(),
            qname_id_column: "qname_id".to_string(),
            parent_column: "parent_qname".to_string(),
            collection_path_column: "collection_path".to_string(),
            value_column: "value".to_string(),
            top_level_marker: "TOP".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration builder
    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder::default()
    }

    /// Load from TOML; missing keys keep their defaults.
    pub fn from_toml(input: &str) -> EavResult<Self> {
        Ok(toml::from_str(input)?)
    }
}

/// Builder for LayoutConfig
#[derive(Debug, Default)]
pub struct LayoutConfigBuilder {
    config: LayoutConfig,
}

impl LayoutConfigBuilder {
    /// Set the entity table and its key columns
    pub fn entity_table(
        mut self,
        table: impl Into<String>,
        pk: impl Into<String>,
        identity: impl Into<String>,
    ) -> Self {
        self.config.entity_table = table.into();
        self.config.entity_pk_column = pk.into();
        self.config.entity_identity_column = identity.into();
        self
    }

    /// Set the type membership table
    pub fn type_table(mut self, table: impl Into<String>, type_id: impl Into<String>) -> Self {
        self.config.type_table = table.into();
        self.config.type_id_column = type_id.into();
        self
    }

    pub fn value_column(mut self, column: impl Into<String>) -> Self {
        self.config.value_column = column.into();
        self
    }

    pub fn collection_path_column(mut self, column: impl Into<String>) -> Self {
        self.config.collection_path_column = column.into();
        self
    }

    pub fn parent_columns(
        mut self,
        qname_id: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        self.config.qname_id_column = qname_id.into();
        self.config.parent_column = parent.into();
        self
    }

    pub fn top_level_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.top_level_marker = marker.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> LayoutConfig {
        self.config
    }
}

/// Limits applied while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Deepest value composite nesting a containment or comparison may descend.
    pub max_value_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self { max_value_depth: 16 }
    }
}
