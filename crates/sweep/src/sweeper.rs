//! High level sweep and cascade delete operations over a connection pool

use crate::cascade::CascadeDeleter;
use crate::queries;
use crate::scanner::ResidualScanner;
use morphsweep_catalog::{resolve, CascadeDelete, EntityRegistry};
use morphsweep_errors::{Error, SweepError};
use morphsweep_events::{
    AppEvent, CascadeEvent, EventEmitter, EventSender, FailureContext, SweepEvent,
};
use morphsweep_types::{CascadeReport, EntityReport, RelationReport, ScanMode, SweepReport};
use sqlx::sqlite::SqliteConnection;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Entry point for residual sweeps and instance cascade deletes
///
/// Every operation runs its statements one after another on a single pooled
/// connection. Sweeps commit label by label; only
/// [`delete_with_dependents`](Self::delete_with_dependents) wraps its work in
/// a transaction.
#[derive(Clone)]
pub struct Sweeper {
    pool: Pool<Sqlite>,
    registry: Arc<dyn EntityRegistry>,
    mode: ScanMode,
    tx: Option<EventSender>,
}

impl std::fmt::Debug for Sweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper")
            .field("mode", &self.mode)
            .field("events", &self.tx.is_some())
            .finish_non_exhaustive()
    }
}

impl Sweeper {
    #[must_use]
    pub fn new(pool: Pool<Sqlite>, registry: Arc<dyn EntityRegistry>) -> Self {
        Self {
            pool,
            registry,
            mode: ScanMode::Delete,
            tx: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Choose whether scans delete or only count
    #[must_use]
    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    #[must_use]
    pub fn registry(&self) -> &dyn EntityRegistry {
        self.registry.as_ref()
    }

    /// Sweep every cascade participant and return the rows removed
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired or a statement
    /// fails. Rows removed before the failure stay removed.
    pub async fn clean_all(&self) -> Result<u64, Error> {
        Ok(self.sweep().await?.total_rows())
    }

    /// Sweep the relations of a single entity and return the rows removed
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired or a statement
    /// fails.
    pub async fn clean_one(&self, entity: &dyn CascadeDelete) -> Result<u64, Error> {
        Ok(self.sweep_entity(entity).await?.rows)
    }

    /// Sweep every cascade participant with a detailed report
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired or a statement
    /// fails.
    pub async fn sweep(&self) -> Result<SweepReport, Error> {
        let correlation = Uuid::new_v4().to_string();
        let emitter = self.emitter(&correlation);
        let start = Instant::now();

        let participants = self.registry.cascade_participants();
        emitter.emit(AppEvent::Sweep(SweepEvent::Started {
            mode: self.mode,
            entities: participants.len(),
        }));

        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => return Err(emitter.sweep_failed(None, e.into())),
        };

        let mut report = SweepReport {
            mode: self.mode,
            ..SweepReport::default()
        };
        for participant in &participants {
            match self
                .scan_entity(&mut conn, participant.as_ref(), &emitter)
                .await
            {
                Ok(entity) => report.entities.push(entity),
                Err(e) => {
                    return Err(emitter.sweep_failed(Some(participant.morph_class()), e));
                }
            }
        }

        report.duration_ms = elapsed_ms(start);
        emitter.emit(AppEvent::Sweep(SweepEvent::Completed {
            mode: self.mode,
            rows: report.total_rows(),
            duration_ms: report.duration_ms,
        }));
        Ok(report)
    }

    /// Sweep the relations of a single entity with a detailed report
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired or a statement
    /// fails.
    pub async fn sweep_entity(&self, entity: &dyn CascadeDelete) -> Result<EntityReport, Error> {
        let correlation = Uuid::new_v4().to_string();
        let emitter = self.emitter(&correlation);

        let result = async {
            let mut conn = self.pool.acquire().await?;
            self.scan_entity(&mut conn, entity, &emitter).await
        }
        .await;

        result.map_err(|e| emitter.sweep_failed(Some(entity.morph_class()), e))
    }

    /// Delete the polymorphic dependents of one persisted record
    ///
    /// The record itself is left in place. Statements run on their own, so
    /// a failure part-way leaves earlier relations cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired or a statement
    /// fails.
    pub async fn delete(&self, entity: &dyn CascadeDelete) -> Result<CascadeReport, Error> {
        let correlation = Uuid::new_v4().to_string();
        let emitter = self.emitter(&correlation);

        let result = async {
            let mut conn = self.pool.acquire().await?;
            CascadeDeleter::new(self.tx.as_ref(), Some(&correlation))
                .delete(&mut conn, entity)
                .await
        }
        .await;

        match result {
            Ok(report) => {
                emitter.emit(AppEvent::Cascade(CascadeEvent::Completed {
                    entity: report.label.clone(),
                    rows: report.dependent_rows(),
                }));
                Ok(report)
            }
            Err(e) => Err(emitter.cascade_failed(entity.morph_class(), e)),
        }
    }

    /// Delete a record together with its polymorphic dependents
    ///
    /// Dependents and the record are removed in one transaction; on any
    /// failure nothing is removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no key, or if any statement or the
    /// commit fails.
    pub async fn delete_with_dependents(
        &self,
        entity: &dyn CascadeDelete,
    ) -> Result<CascadeReport, Error> {
        let correlation = Uuid::new_v4().to_string();
        let emitter = self.emitter(&correlation);

        let Some(key) = entity.key() else {
            return Err(emitter.cascade_failed(
                entity.morph_class(),
                SweepError::MissingParentKey {
                    label: entity.morph_class().to_string(),
                }
                .into(),
            ));
        };

        let result = async {
            let mut tx = self.pool.begin().await.map_err(transaction_failed)?;
            let mut report = CascadeDeleter::new(self.tx.as_ref(), Some(&correlation))
                .delete(&mut *tx, entity)
                .await?;

            let rows = queries::delete_parent(&mut *tx, &entity.meta(), &key).await?;
            tx.commit().await.map_err(transaction_failed)?;

            report.parent_deleted = rows > 0;
            Ok::<_, Error>((report, rows))
        }
        .await;

        match result {
            Ok((report, rows)) => {
                emitter.emit(AppEvent::Cascade(CascadeEvent::ParentDeleted {
                    entity: report.label.clone(),
                    key,
                    rows,
                }));
                emitter.emit(AppEvent::Cascade(CascadeEvent::Completed {
                    entity: report.label.clone(),
                    rows: report.dependent_rows() + rows,
                }));
                Ok(report)
            }
            Err(e) => Err(emitter.cascade_failed(entity.morph_class(), e)),
        }
    }

    async fn scan_entity(
        &self,
        conn: &mut SqliteConnection,
        entity: &dyn CascadeDelete,
        emitter: &OperationEmitter<'_>,
    ) -> Result<EntityReport, Error> {
        let label = entity.morph_class().to_string();
        emitter.emit(AppEvent::Sweep(SweepEvent::EntityStarted {
            entity: label.clone(),
        }));

        let resolution = resolve(entity);
        for skipped in &resolution.skipped {
            emitter.emit(AppEvent::Sweep(SweepEvent::AccessorSkipped {
                entity: label.clone(),
                accessor: skipped.accessor.clone(),
                reason: skipped.reason,
            }));
        }

        let scanner = ResidualScanner::new(self.registry.as_ref())
            .with_mode(self.mode)
            .with_events(self.tx.as_ref(), Some(emitter.correlation));

        let mut relations = Vec::with_capacity(resolution.relations.len());
        for named in resolution.relations {
            let outcome = scanner.scan(conn, &named.descriptor).await?;
            emitter.emit(AppEvent::Sweep(SweepEvent::RelationScanned {
                entity: label.clone(),
                accessor: named.accessor.clone(),
                table: named.descriptor.child_table.clone(),
                rows: outcome.rows,
            }));
            relations.push(RelationReport {
                accessor: named.accessor,
                descriptor: named.descriptor,
                labels: outcome.labels,
                rows: outcome.rows,
            });
        }

        let rows = relations.iter().map(|r| r.rows).sum();
        emitter.emit(AppEvent::Sweep(SweepEvent::EntityCompleted {
            entity: label.clone(),
            rows,
        }));

        Ok(EntityReport {
            label,
            relations,
            skipped: resolution.skipped,
            rows,
        })
    }

    fn emitter<'a>(&'a self, correlation: &'a str) -> OperationEmitter<'a> {
        OperationEmitter {
            tx: self.tx.as_ref(),
            correlation,
        }
    }
}

/// Emitter bound to one operation's correlation id
struct OperationEmitter<'a> {
    tx: Option<&'a EventSender>,
    correlation: &'a str,
}

impl OperationEmitter<'_> {
    fn sweep_failed(&self, entity: Option<&str>, error: Error) -> Error {
        self.emit(AppEvent::Sweep(SweepEvent::Failed {
            entity: entity.map(str::to_string),
            failure: FailureContext::from_error(&error),
        }));
        error
    }

    fn cascade_failed(&self, entity: &str, error: Error) -> Error {
        self.emit(AppEvent::Cascade(CascadeEvent::Failed {
            entity: entity.to_string(),
            failure: FailureContext::from_error(&error),
        }));
        error
    }
}

impl EventEmitter for OperationEmitter<'_> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx
    }

    fn correlation_id(&self) -> Option<&str> {
        Some(self.correlation)
    }
}

fn transaction_failed(e: sqlx::Error) -> Error {
    SweepError::TransactionFailed {
        message: e.to_string(),
    }
    .into()
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
