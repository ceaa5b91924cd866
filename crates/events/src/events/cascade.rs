use serde::{Deserialize, Serialize};

use super::FailureContext;
use morphsweep_types::{KeyValue, RelationKind};

/// Instance-scoped cascade delete events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CascadeEvent {
    Started { entity: String, key: KeyValue },

    /// Record was never persisted; nothing can reference it
    NoKey { entity: String },

    /// Dependents of one relation deleted (or pivot rows detached)
    RelationCleared {
        entity: String,
        accessor: String,
        table: String,
        kind: RelationKind,
        rows: u64,
    },

    ParentDeleted {
        entity: String,
        key: KeyValue,
        rows: u64,
    },

    Completed { entity: String, rows: u64 },

    Failed {
        entity: String,
        failure: FailureContext,
    },
}
