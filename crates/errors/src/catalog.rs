//! Entity registry and relation catalog error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown entity: {label}")]
    UnknownEntity { label: String },

    #[error("entity {label} does not participate in cascade delete")]
    NotCascadeParticipant { label: String },

    #[error("entity label registered twice: {label}")]
    DuplicateLabel { label: String },

    #[error("invalid key {value:?} for entity {label}: {message}")]
    InvalidKey {
        label: String,
        value: String,
        message: String,
    },
}

impl UserFacingError for CatalogError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownEntity { .. } => Some("Run `morphsweep entities` to list known labels."),
            Self::NotCascadeParticipant { .. } => {
                Some("Set `cascade = true` on the entity in the configuration file.")
            }
            Self::DuplicateLabel { .. } => Some("Each entity label must be declared once."),
            Self::InvalidKey { .. } => Some("Check the entity's `key_type` setting."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnknownEntity { .. } => "catalog.unknown_entity",
            Self::NotCascadeParticipant { .. } => "catalog.not_cascade_participant",
            Self::DuplicateLabel { .. } => "catalog.duplicate_label",
            Self::InvalidKey { .. } => "catalog.invalid_key",
        };
        Some(code)
    }
}
