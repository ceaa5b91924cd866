use serde::{Deserialize, Serialize};

use super::FailureContext;
use morphsweep_types::{ScanMode, SkipReason};

/// Residual sweep events, emitted in scan order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SweepEvent {
    /// Sweep over all cascade participants started
    Started { mode: ScanMode, entities: usize },

    /// Scanning the relations of one entity
    EntityStarted { entity: String },

    /// A declared accessor contributed no relation
    AccessorSkipped {
        entity: String,
        accessor: String,
        reason: SkipReason,
    },

    /// One distinct type label in a child table was handled
    LabelPurged {
        table: String,
        label: Option<String>,
        /// `None` when the label no longer maps to an entity
        parent_table: Option<String>,
        rows: u64,
        dry_run: bool,
    },

    /// All labels of one relation handled
    RelationScanned {
        entity: String,
        accessor: String,
        table: String,
        rows: u64,
    },

    /// All relations of one entity handled
    EntityCompleted { entity: String, rows: u64 },

    /// Sweep finished
    Completed {
        mode: ScanMode,
        rows: u64,
        duration_ms: u64,
    },

    /// Sweep aborted on a database failure
    Failed {
        entity: Option<String>,
        failure: FailureContext,
    },
}
