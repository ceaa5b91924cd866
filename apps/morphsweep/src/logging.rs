//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so
//! sweeps can be followed in JSON logs by correlation id.

use morphsweep_events::{AppEvent, CascadeEvent, EventMessage, GeneralEvent, SweepEvent};
use tracing::{debug, error, info, trace, warn};

/// Log an event at its level with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    match &message.event {
        AppEvent::General(GeneralEvent::ConfigurationValidated {
            source,
            entities,
            warnings,
        }) => {
            if warnings.is_empty() {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    config = %source,
                    entities = entities,
                    "Configuration validated"
                );
            } else {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    config = %source,
                    entities = entities,
                    warnings = ?warnings,
                    "Configuration validated with warnings"
                );
            }
        }

        AppEvent::Sweep(sweep) => match sweep {
            SweepEvent::Started { mode, entities } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    mode = ?mode,
                    entities = entities,
                    "Sweep started"
                );
            }
            SweepEvent::EntityStarted { entity } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    "Scanning entity relations"
                );
            }
            SweepEvent::AccessorSkipped {
                entity,
                accessor,
                reason,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    accessor = %accessor,
                    reason = %reason,
                    "Accessor skipped"
                );
            }
            SweepEvent::LabelPurged {
                table,
                label,
                parent_table,
                rows,
                dry_run,
            } => {
                if *rows == 0 {
                    trace!(
                        source = meta.source.as_str(),
                        correlation = ?meta.correlation_id,
                        table = %table,
                        label = ?label,
                        "No residual rows for label"
                    );
                } else {
                    info!(
                        source = meta.source.as_str(),
                        event_id = %meta.event_id,
                        correlation = ?meta.correlation_id,
                        table = %table,
                        label = ?label,
                        parent_table = ?parent_table,
                        rows = rows,
                        dry_run = dry_run,
                        "Residual rows purged"
                    );
                }
            }
            SweepEvent::RelationScanned {
                entity,
                accessor,
                table,
                rows,
            } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    accessor = %accessor,
                    table = %table,
                    rows = rows,
                    "Relation scanned"
                );
            }
            SweepEvent::EntityCompleted { entity, rows } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    rows = rows,
                    "Entity swept"
                );
            }
            SweepEvent::Completed {
                mode,
                rows,
                duration_ms,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    mode = ?mode,
                    rows = rows,
                    duration_ms = duration_ms,
                    "Sweep completed"
                );
            }
            SweepEvent::Failed { entity, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    entity = ?entity,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Sweep failed"
                );
            }
        },

        AppEvent::Cascade(cascade) => match cascade {
            CascadeEvent::Started { entity, key } => {
                debug!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    key = %key,
                    "Cascade delete started"
                );
            }
            CascadeEvent::NoKey { entity } => {
                warn!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    "Record has no key; nothing to cascade"
                );
            }
            CascadeEvent::RelationCleared {
                entity,
                accessor,
                table,
                kind,
                rows,
            } => {
                info!(
                    source = meta.source.as_str(),
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    accessor = %accessor,
                    table = %table,
                    kind = %kind,
                    rows = rows,
                    "Dependents cleared"
                );
            }
            CascadeEvent::ParentDeleted { entity, key, rows } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    key = %key,
                    rows = rows,
                    "Record deleted"
                );
            }
            CascadeEvent::Completed { entity, rows } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    rows = rows,
                    "Cascade delete completed"
                );
            }
            CascadeEvent::Failed { entity, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    entity = %entity,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Cascade delete failed"
                );
            }
        },
    }
}
