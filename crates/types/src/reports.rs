//! Report type definitions for sweeps and cascade deletes

use crate::key::KeyValue;
use crate::relation::{RelationDescriptor, RelationKind, SkippedAccessor};
use serde::{Deserialize, Serialize};

/// Whether a scan removes residual rows or only counts them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Delete,
    DryRun,
}

impl ScanMode {
    #[must_use]
    pub fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Result of handling one distinct type label in a child table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelOutcome {
    /// Stored label (`None` for SQL NULL)
    pub label: Option<String>,
    /// Parent table the label resolved to; `None` when the type is gone
    pub parent_table: Option<String>,
    /// Rows removed (or that would be removed in a dry run)
    pub rows: u64,
}

impl LabelOutcome {
    /// True when the label no longer maps to any known entity
    #[must_use]
    pub fn is_dangling(&self) -> bool {
        self.parent_table.is_none()
    }
}

/// Per-relation scan result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationReport {
    pub accessor: String,
    pub descriptor: RelationDescriptor,
    pub labels: Vec<LabelOutcome>,
    pub rows: u64,
}

/// Per-entity scan result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReport {
    pub label: String,
    pub relations: Vec<RelationReport>,
    pub skipped: Vec<SkippedAccessor>,
    pub rows: u64,
}

/// Full sweep report
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub mode: ScanMode,
    pub entities: Vec<EntityReport>,
    /// Total execution time
    pub duration_ms: u64,
}

impl SweepReport {
    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.entities.iter().map(|e| e.rows).sum()
    }
}

/// Rows removed through one relation during a cascade delete
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadedRelation {
    pub accessor: String,
    pub table: String,
    pub kind: RelationKind,
    pub rows: u64,
}

/// Result of deleting the dependents of one parent record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub label: String,
    pub key: Option<KeyValue>,
    pub relations: Vec<CascadedRelation>,
    /// Whether the parent row itself was removed
    pub parent_deleted: bool,
}

impl CascadeReport {
    /// Dependent rows removed (pivot rows included)
    #[must_use]
    pub fn dependent_rows(&self) -> u64 {
        self.relations.iter().map(|r| r.rows).sum()
    }
}
