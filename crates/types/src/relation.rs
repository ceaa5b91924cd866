//! Relation declarations and resolved polymorphic descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of a polymorphic relation as seen from the parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Children live in their own table (morph-one / morph-many)
    OneToMany,
    /// Children are pivot rows linking the parent to another entity
    ManyToMany,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneToMany => write!(f, "one-to-many"),
            Self::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

/// A resolved polymorphic relation
///
/// For [`RelationKind::ManyToMany`], `child_table` is the pivot table and
/// `morph_key_column` is the pivot column pointing back at the parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationDescriptor {
    pub child_table: String,
    pub morph_type_column: String,
    pub morph_key_column: String,
    pub kind: RelationKind,
}

impl RelationDescriptor {
    #[must_use]
    pub fn new(
        child_table: impl Into<String>,
        morph_type_column: impl Into<String>,
        morph_key_column: impl Into<String>,
        kind: RelationKind,
    ) -> Self {
        Self {
            child_table: child_table.into(),
            morph_type_column: morph_type_column.into(),
            morph_key_column: morph_key_column.into(),
            kind,
        }
    }
}

/// Any relation an entity may expose through an accessor
///
/// Only the morph variants that own children (`MorphOne`, `MorphMany`,
/// `MorphToMany`) produce a [`RelationDescriptor`]; everything else is
/// ignored by sweeps and cascade deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relation {
    HasOne {
        table: String,
        foreign_key: String,
    },
    HasMany {
        table: String,
        foreign_key: String,
    },
    BelongsTo {
        table: String,
        foreign_key: String,
    },
    BelongsToMany {
        pivot_table: String,
        foreign_pivot_key: String,
        related_pivot_key: String,
    },
    /// Inverse side of a polymorphic relation; owns no children
    MorphTo {
        morph_type: String,
        morph_key: String,
    },
    MorphOne {
        table: String,
        morph_type: String,
        morph_key: String,
    },
    MorphMany {
        table: String,
        morph_type: String,
        morph_key: String,
    },
    MorphToMany {
        pivot_table: String,
        morph_type: String,
        foreign_pivot_key: String,
        related_pivot_key: String,
    },
}

impl Relation {
    /// Morph-many relation using the `{name}_type` / `{name}_id` column convention
    #[must_use]
    pub fn morph_many(table: impl Into<String>, name: &str) -> Self {
        Self::MorphMany {
            table: table.into(),
            morph_type: format!("{name}_type"),
            morph_key: format!("{name}_id"),
        }
    }

    /// Morph-one relation using the `{name}_type` / `{name}_id` column convention
    #[must_use]
    pub fn morph_one(table: impl Into<String>, name: &str) -> Self {
        Self::MorphOne {
            table: table.into(),
            morph_type: format!("{name}_type"),
            morph_key: format!("{name}_id"),
        }
    }

    /// Morph-to-many relation through `pivot_table`, following the
    /// `{name}_type` / `{name}_id` convention for the parent side
    #[must_use]
    pub fn morph_to_many(
        pivot_table: impl Into<String>,
        name: &str,
        related_pivot_key: impl Into<String>,
    ) -> Self {
        Self::MorphToMany {
            pivot_table: pivot_table.into(),
            morph_type: format!("{name}_type"),
            foreign_pivot_key: format!("{name}_id"),
            related_pivot_key: related_pivot_key.into(),
        }
    }

    /// Whether this relation owns polymorphic children
    #[must_use]
    pub fn is_morphic(&self) -> bool {
        matches!(
            self,
            Self::MorphOne { .. } | Self::MorphMany { .. } | Self::MorphToMany { .. }
        )
    }

    /// Resolve the polymorphic descriptor, if this relation has one
    #[must_use]
    pub fn morph_descriptor(&self) -> Option<RelationDescriptor> {
        match self {
            Self::MorphOne {
                table,
                morph_type,
                morph_key,
            }
            | Self::MorphMany {
                table,
                morph_type,
                morph_key,
            } => Some(RelationDescriptor::new(
                table,
                morph_type,
                morph_key,
                RelationKind::OneToMany,
            )),
            Self::MorphToMany {
                pivot_table,
                morph_type,
                foreign_pivot_key,
                ..
            } => Some(RelationDescriptor::new(
                pivot_table,
                morph_type,
                foreign_pivot_key,
                RelationKind::ManyToMany,
            )),
            _ => None,
        }
    }
}

/// Why a declared accessor contributed no relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The entity does not expose an accessor with that name
    UnresolvableAccessor,
    /// The accessor exists but is not a polymorphic parent relation
    NonMorphicRelation,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvableAccessor => write!(f, "accessor not found"),
            Self::NonMorphicRelation => write!(f, "not a morph relation"),
        }
    }
}

/// A declared accessor that was left out of the resolved relation set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAccessor {
    pub accessor: String,
    pub reason: SkipReason,
}
