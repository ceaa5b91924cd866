//! Entity registries: type label resolution and cascade participants

use crate::model::{CascadeDelete, Model};
use morphsweep_errors::{CatalogError, Error};
use morphsweep_types::EntityMeta;
use std::collections::HashMap;

/// Source of entity metadata for sweeps
pub trait EntityRegistry: Send + Sync {
    /// Resolve a stored type label to the entity it names, if it still exists
    fn resolve_label(&self, label: &str) -> Option<EntityMeta>;

    /// One representative instance per entity included in full sweeps
    fn cascade_participants(&self) -> Vec<Box<dyn CascadeDelete>>;

    /// Representative instance of a single participant
    ///
    /// # Errors
    ///
    /// Returns an error if the label is unknown or not a participant.
    fn participant(&self, label: &str) -> Result<Box<dyn CascadeDelete>, Error> {
        if self.resolve_label(label).is_none() {
            return Err(CatalogError::UnknownEntity {
                label: label.to_string(),
            }
            .into());
        }
        self.cascade_participants()
            .into_iter()
            .find(|p| p.morph_class() == label)
            .ok_or_else(|| {
                CatalogError::NotCascadeParticipant {
                    label: label.to_string(),
                }
                .into()
            })
    }
}

type Factory = fn() -> Box<dyn CascadeDelete>;

fn instantiate<M: CascadeDelete + Default + 'static>() -> Box<dyn CascadeDelete> {
    Box::new(M::default())
}

/// Registry of entities known at compile time
pub struct StaticRegistry {
    entities: HashMap<String, EntityMeta>,
    participants: Vec<Factory>,
}

impl StaticRegistry {
    #[must_use]
    pub fn builder() -> StaticRegistryBuilder {
        StaticRegistryBuilder::default()
    }

    /// Number of resolvable labels
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityRegistry for StaticRegistry {
    fn resolve_label(&self, label: &str) -> Option<EntityMeta> {
        self.entities.get(label).cloned()
    }

    fn cascade_participants(&self) -> Vec<Box<dyn CascadeDelete>> {
        self.participants.iter().map(|make| make()).collect()
    }
}

/// Builder for [`StaticRegistry`]
#[derive(Default)]
pub struct StaticRegistryBuilder {
    entities: Vec<EntityMeta>,
    participants: Vec<Factory>,
}

impl StaticRegistryBuilder {
    /// Make `M`'s label resolvable without including it in sweeps
    #[must_use]
    pub fn entity<M: Model + Default>(mut self) -> Self {
        self.entities.push(M::default().meta());
        self
    }

    /// Register `M` as a cascade-delete participant
    #[must_use]
    pub fn cascade<M: CascadeDelete + Default + 'static>(mut self) -> Self {
        self.entities.push(M::default().meta());
        self.participants.push(instantiate::<M>);
        self
    }

    /// Resolve an extra label (e.g. a legacy class name) to an existing table
    #[must_use]
    pub fn alias(mut self, meta: EntityMeta) -> Self {
        self.entities.push(meta);
        self
    }

    /// Build the registry
    ///
    /// # Errors
    ///
    /// Returns an error if two registrations share a label.
    pub fn build(self) -> Result<StaticRegistry, Error> {
        let mut entities = HashMap::with_capacity(self.entities.len());
        for meta in self.entities {
            if entities.contains_key(&meta.label) {
                return Err(CatalogError::DuplicateLabel { label: meta.label }.into());
            }
            entities.insert(meta.label.clone(), meta);
        }

        Ok(StaticRegistry {
            entities,
            participants: self.participants,
        })
    }
}
