//! Entities declared in configuration

use crate::model::{CascadeDelete, Model};
use crate::registry::EntityRegistry;
use morphsweep_errors::{CatalogError, Error};
use morphsweep_types::{EntityDefinition, EntityMeta, KeyValue, Relation};
use std::collections::HashMap;
use std::sync::Arc;

/// Instance of a declared entity, optionally bound to a key
#[derive(Debug, Clone)]
pub struct DeclaredEntity {
    definition: Arc<EntityDefinition>,
    key: Option<KeyValue>,
}

impl DeclaredEntity {
    #[must_use]
    pub fn definition(&self) -> &EntityDefinition {
        &self.definition
    }
}

impl Model for DeclaredEntity {
    fn morph_class(&self) -> &str {
        &self.definition.label
    }

    fn table(&self) -> &str {
        &self.definition.table
    }

    fn key_name(&self) -> &str {
        &self.definition.key
    }

    fn key(&self) -> Option<KeyValue> {
        self.key.clone()
    }
}

impl CascadeDelete for DeclaredEntity {
    fn cascade_delete_morph(&self) -> Vec<&str> {
        self.definition
            .cascade_delete_morph
            .iter()
            .map(String::as_str)
            .collect()
    }

    fn relation(&self, accessor: &str) -> Option<Relation> {
        self.definition.relations.get(accessor).cloned()
    }
}

/// Registry built from [`EntityDefinition`]s
#[derive(Debug, Clone, Default)]
pub struct DeclaredRegistry {
    definitions: Vec<Arc<EntityDefinition>>,
    by_label: HashMap<String, usize>,
}

impl DeclaredRegistry {
    /// Build a registry, preserving declaration order
    ///
    /// # Errors
    ///
    /// Returns an error if a label is declared twice.
    pub fn new(definitions: impl IntoIterator<Item = EntityDefinition>) -> Result<Self, Error> {
        let mut registry = Self::default();
        for definition in definitions {
            if registry.by_label.contains_key(&definition.label) {
                return Err(CatalogError::DuplicateLabel {
                    label: definition.label,
                }
                .into());
            }
            registry
                .by_label
                .insert(definition.label.clone(), registry.definitions.len());
            registry.definitions.push(Arc::new(definition));
        }
        Ok(registry)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &EntityDefinition> {
        self.definitions.iter().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn definition(&self, label: &str) -> Option<&EntityDefinition> {
        self.lookup(label).map(AsRef::as_ref)
    }

    fn lookup(&self, label: &str) -> Option<&Arc<EntityDefinition>> {
        self.by_label.get(label).map(|&i| &self.definitions[i])
    }

    /// Unkeyed instance of a declared entity
    ///
    /// # Errors
    ///
    /// Returns an error if the label is not declared.
    pub fn representative(&self, label: &str) -> Result<DeclaredEntity, Error> {
        let definition = self
            .lookup(label)
            .ok_or_else(|| CatalogError::UnknownEntity {
                label: label.to_string(),
            })?;
        Ok(DeclaredEntity {
            definition: Arc::clone(definition),
            key: None,
        })
    }

    /// Instance of a declared entity bound to `raw_key`, parsed per the
    /// entity's `key_type`
    ///
    /// # Errors
    ///
    /// Returns an error if the label is not declared or the key does not parse.
    pub fn instance(&self, label: &str, raw_key: &str) -> Result<DeclaredEntity, Error> {
        let mut entity = self.representative(label)?;
        let key = entity
            .definition
            .key_type
            .parse(raw_key)
            .map_err(|message| CatalogError::InvalidKey {
                label: label.to_string(),
                value: raw_key.to_string(),
                message,
            })?;
        entity.key = Some(key);
        Ok(entity)
    }
}

impl EntityRegistry for DeclaredRegistry {
    fn resolve_label(&self, label: &str) -> Option<EntityMeta> {
        self.lookup(label).map(|d| d.meta())
    }

    fn cascade_participants(&self) -> Vec<Box<dyn CascadeDelete>> {
        self.definitions
            .iter()
            .filter(|d| d.cascade)
            .map(|d| {
                Box::new(DeclaredEntity {
                    definition: Arc::clone(d),
                    key: None,
                }) as Box<dyn CascadeDelete>
            })
            .collect()
    }
}
