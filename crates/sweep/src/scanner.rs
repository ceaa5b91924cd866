//! Residual row discovery and removal for one relation

use crate::queries;
use crate::sql::RelationStatements;
use morphsweep_catalog::EntityRegistry;
use morphsweep_errors::Error;
use morphsweep_events::{AppEvent, EventEmitter, EventSender, SweepEvent};
use morphsweep_types::{LabelOutcome, RelationDescriptor, ScanMode};
use sqlx::sqlite::SqliteConnection;

/// Result of scanning one relation's child table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub labels: Vec<LabelOutcome>,
    pub rows: u64,
}

/// Finds child rows whose `(type, id)` no longer points at a parent
///
/// Every distinct label in the child table is resolved through the registry
/// once. Labels naming a known entity lose the rows whose parent id is
/// missing; labels naming nothing lose all of their rows. Each label is one
/// statement on its own; nothing wraps them in a transaction.
pub struct ResidualScanner<'a> {
    registry: &'a dyn EntityRegistry,
    mode: ScanMode,
    events: Option<&'a EventSender>,
    correlation: Option<&'a str>,
}

impl<'a> ResidualScanner<'a> {
    #[must_use]
    pub fn new(registry: &'a dyn EntityRegistry) -> Self {
        Self {
            registry,
            mode: ScanMode::Delete,
            events: None,
            correlation: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_events(
        mut self,
        events: Option<&'a EventSender>,
        correlation: Option<&'a str>,
    ) -> Self {
        self.events = events;
        self.correlation = correlation;
        self
    }

    /// Scan one relation and return the rows removed
    ///
    /// # Errors
    ///
    /// Returns the first database error; rows already removed for earlier
    /// labels stay removed.
    pub async fn scan(
        &self,
        conn: &mut SqliteConnection,
        descriptor: &RelationDescriptor,
    ) -> Result<ScanOutcome, Error> {
        let statements = RelationStatements::new(descriptor)?;
        let labels = queries::distinct_labels(conn, &statements).await?;

        let mut outcome = ScanOutcome::default();
        for label in labels {
            let parent = label
                .as_deref()
                .and_then(|l| self.registry.resolve_label(l));

            let rows = match (label.as_deref(), &parent) {
                (Some(l), Some(meta)) => {
                    queries::purge_orphans(conn, &statements, meta, l, self.mode).await?
                }
                (label, _) => queries::purge_label(conn, &statements, label, self.mode).await?,
            };

            let parent_table = parent.map(|meta| meta.table);
            self.emit(AppEvent::Sweep(SweepEvent::LabelPurged {
                table: descriptor.child_table.clone(),
                label: label.clone(),
                parent_table: parent_table.clone(),
                rows,
                dry_run: self.mode.is_dry_run(),
            }));

            outcome.rows += rows;
            outcome.labels.push(LabelOutcome {
                label,
                parent_table,
                rows,
            });
        }

        Ok(outcome)
    }
}

impl EventEmitter for ResidualScanner<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events
    }

    fn correlation_id(&self) -> Option<&str> {
        self.correlation
    }
}
