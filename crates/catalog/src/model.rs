//! Traits implemented by entities that own polymorphic children

use morphsweep_types::{EntityMeta, KeyValue, Relation};

/// A record type backed by a table
pub trait Model: Send + Sync {
    /// Label stored in morph type columns for this entity
    fn morph_class(&self) -> &str;

    /// Backing table
    fn table(&self) -> &str;

    /// Identifier column
    fn key_name(&self) -> &str {
        "id"
    }

    /// Identifier of this instance; `None` until the record is persisted
    fn key(&self) -> Option<KeyValue>;

    fn meta(&self) -> EntityMeta {
        EntityMeta::new(self.morph_class(), self.table(), self.key_name())
    }
}

/// Marker capability for entities whose polymorphic children are cleaned up
///
/// `cascade_delete_morph` lists accessor names in the order they are
/// processed; `relation` maps an accessor name to the relation it returns.
/// Names with no accessor, and accessors returning anything but a morph
/// relation, are skipped.
pub trait CascadeDelete: Model {
    fn cascade_delete_morph(&self) -> Vec<&str>;

    fn relation(&self, accessor: &str) -> Option<Relation>;
}
