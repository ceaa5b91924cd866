//! Entity metadata and declarations

use crate::key::KeyType;
use crate::relation::Relation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the registry knows about an entity a type label resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Type label stored in morph type columns
    pub label: String,
    /// Backing table
    pub table: String,
    /// Identifier column of the backing table
    pub key_column: String,
}

impl EntityMeta {
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        table: impl Into<String>,
        key_column: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            table: table.into(),
            key_column: key_column.into(),
        }
    }
}

/// Entity declared in configuration rather than in Rust code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub label: String,
    pub table: String,
    #[serde(default = "default_key_column")]
    pub key: String,
    #[serde(default)]
    pub key_type: KeyType,
    /// Include this entity in full sweeps
    #[serde(default)]
    pub cascade: bool,
    /// Ordered accessor names whose relations are cascaded
    #[serde(default)]
    pub cascade_delete_morph: Vec<String>,
    /// Accessor name to relation
    #[serde(default)]
    pub relations: BTreeMap<String, Relation>,
}

impl EntityDefinition {
    #[must_use]
    pub fn meta(&self) -> EntityMeta {
        EntityMeta::new(&self.label, &self.table, &self.key)
    }
}

fn default_key_column() -> String {
    "id".to_string()
}
