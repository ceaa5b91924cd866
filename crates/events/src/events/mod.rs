use serde::{Deserialize, Serialize};

use crate::EventSource;
use morphsweep_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod cascade;
pub mod general;
pub mod sweep;

pub use cascade::*;
pub use general::*;
pub use sweep::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Run-wide events (configuration)
    General(GeneralEvent),

    /// Residual sweep events
    Sweep(SweepEvent),

    /// Cascade delete events
    Cascade(CascadeEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Sweep(_) => EventSource::SWEEP,
            Self::Cascade(_) => EventSource::CASCADE,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::Sweep(SweepEvent::Failed { .. })
            | Self::Cascade(CascadeEvent::Failed { .. }) => Level::ERROR,

            Self::Cascade(CascadeEvent::NoKey { .. }) => Level::WARN,
            Self::General(GeneralEvent::ConfigurationValidated { warnings, .. })
                if !warnings.is_empty() =>
            {
                Level::WARN
            }

            Self::Sweep(SweepEvent::AccessorSkipped { .. } | SweepEvent::EntityStarted { .. })
            | Self::Cascade(CascadeEvent::Started { .. }) => Level::DEBUG,

            // Labels with nothing to remove are the common case on a clean dataset
            Self::Sweep(SweepEvent::LabelPurged { rows: 0, .. }) => Level::TRACE,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "morphsweep::events::general",
            Self::Sweep(_) => "morphsweep::events::sweep",
            Self::Cascade(_) => "morphsweep::events::cascade",
        }
    }
}
