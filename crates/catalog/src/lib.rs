#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Entity registries and relation catalog for morphsweep
//!
//! Entities describe their polymorphic relations through the
//! [`CascadeDelete`] trait: an ordered list of accessor names and a typed
//! lookup from name to [`Relation`](morphsweep_types::Relation). The
//! catalog turns that into the [`RelationDescriptor`]s sweeps operate on.
//! Registries resolve stored type labels back to entities and enumerate the
//! cascade participants.
//!
//! [`RelationDescriptor`]: morphsweep_types::RelationDescriptor

pub mod catalog;
pub mod declared;
pub mod model;
pub mod registry;

pub use catalog::{relations_for, resolve, CatalogResolution, NamedRelation};
pub use declared::{DeclaredEntity, DeclaredRegistry};
pub use model::{CascadeDelete, Model};
pub use registry::{EntityRegistry, StaticRegistry, StaticRegistryBuilder};
