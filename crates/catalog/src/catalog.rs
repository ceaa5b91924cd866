//! Resolution of an entity's declared accessors into morph relations

use crate::model::CascadeDelete;
use morphsweep_types::{RelationDescriptor, SkipReason, SkippedAccessor};

/// A morph relation together with the accessor that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRelation {
    pub accessor: String,
    pub descriptor: RelationDescriptor,
}

/// Every declared accessor, sorted into usable relations and skips
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogResolution {
    pub relations: Vec<NamedRelation>,
    pub skipped: Vec<SkippedAccessor>,
}

/// Resolve the declared accessors of `entity`, keeping declaration order
pub fn resolve<E: CascadeDelete + ?Sized>(entity: &E) -> CatalogResolution {
    let mut resolution = CatalogResolution::default();

    for accessor in entity.cascade_delete_morph() {
        let Some(relation) = entity.relation(accessor) else {
            resolution.skipped.push(SkippedAccessor {
                accessor: accessor.to_string(),
                reason: SkipReason::UnresolvableAccessor,
            });
            continue;
        };

        match relation.morph_descriptor() {
            Some(descriptor) => resolution.relations.push(NamedRelation {
                accessor: accessor.to_string(),
                descriptor,
            }),
            None => resolution.skipped.push(SkippedAccessor {
                accessor: accessor.to_string(),
                reason: SkipReason::NonMorphicRelation,
            }),
        }
    }

    resolution
}

/// Morph relation descriptors of `entity`, in declaration order
pub fn relations_for<E: CascadeDelete + ?Sized>(entity: &E) -> Vec<RelationDescriptor> {
    resolve(entity)
        .relations
        .into_iter()
        .map(|named| named.descriptor)
        .collect()
}
