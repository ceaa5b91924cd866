#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for morphsweep
//!
//! This crate provides the data shared by every other crate: parent keys,
//! polymorphic relation descriptors, declared entity definitions, and the
//! reports produced by sweeps and cascade deletes.

pub mod entity;
pub mod key;
pub mod relation;
pub mod reports;

// Re-export commonly used types
pub use entity::{EntityDefinition, EntityMeta};
pub use key::{KeyType, KeyValue};
pub use relation::{Relation, RelationDescriptor, RelationKind, SkipReason, SkippedAccessor};
pub use reports::{
    CascadeReport, CascadedRelation, EntityReport, LabelOutcome, RelationReport, ScanMode,
    SweepReport,
};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    Tty,
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
