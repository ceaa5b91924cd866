//! Instance-scoped removal of polymorphic dependents

use crate::queries;
use crate::sql::RelationStatements;
use morphsweep_catalog::{resolve, CascadeDelete};
use morphsweep_errors::Error;
use morphsweep_events::{AppEvent, CascadeEvent, EventEmitter, EventSender, SweepEvent};
use morphsweep_types::{CascadeReport, CascadedRelation};
use sqlx::sqlite::SqliteConnection;

/// Deletes the children (or pivot rows) owned by one parent record
///
/// Each declared morph relation is cleared with a single statement scoped to
/// the parent's label and key. Many-to-many relations only lose their pivot
/// rows; the related records are left alone.
pub struct CascadeDeleter<'a> {
    events: Option<&'a EventSender>,
    correlation: Option<&'a str>,
}

impl<'a> CascadeDeleter<'a> {
    #[must_use]
    pub fn new(events: Option<&'a EventSender>, correlation: Option<&'a str>) -> Self {
        Self {
            events,
            correlation,
        }
    }

    /// Remove every dependent of `entity`
    ///
    /// A record without a key issues no statements.
    ///
    /// # Errors
    ///
    /// Returns the first database error. Relations cleared before the failure
    /// stay cleared unless `conn` belongs to a transaction the caller rolls
    /// back.
    pub async fn delete<E: CascadeDelete + ?Sized>(
        &self,
        conn: &mut SqliteConnection,
        entity: &E,
    ) -> Result<CascadeReport, Error> {
        let label = entity.morph_class().to_string();
        let mut report = CascadeReport {
            label: label.clone(),
            key: entity.key(),
            relations: Vec::new(),
            parent_deleted: false,
        };

        let Some(key) = report.key.clone() else {
            self.emit(AppEvent::Cascade(CascadeEvent::NoKey { entity: label }));
            return Ok(report);
        };

        self.emit(AppEvent::Cascade(CascadeEvent::Started {
            entity: label.clone(),
            key: key.clone(),
        }));

        let resolution = resolve(entity);
        for skipped in resolution.skipped {
            self.emit(AppEvent::Sweep(SweepEvent::AccessorSkipped {
                entity: label.clone(),
                accessor: skipped.accessor,
                reason: skipped.reason,
            }));
        }

        for named in resolution.relations {
            let statements = RelationStatements::new(&named.descriptor)?;
            let rows = queries::delete_dependents(conn, &statements, &label, &key).await?;

            self.emit(AppEvent::Cascade(CascadeEvent::RelationCleared {
                entity: label.clone(),
                accessor: named.accessor.clone(),
                table: named.descriptor.child_table.clone(),
                kind: named.descriptor.kind,
                rows,
            }));

            report.relations.push(CascadedRelation {
                accessor: named.accessor,
                table: named.descriptor.child_table,
                kind: named.descriptor.kind,
                rows,
            });
        }

        Ok(report)
    }
}

impl EventEmitter for CascadeDeleter<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events
    }

    fn correlation_id(&self) -> Option<&str> {
        self.correlation
    }
}
