//! Residual sweep and cascade delete error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SweepError {
    #[error("database error: {message}")]
    Database { message: String },

    #[error("failed to open database {url}: {message}")]
    ConnectFailed { url: String, message: String },

    #[error("transaction failed: {message}")]
    TransactionFailed { message: String },

    #[error("entity {label} has no key value")]
    MissingParentKey { label: String },

    #[error("invalid identifier: {ident:?}")]
    InvalidIdentifier { ident: String },
}

impl UserFacingError for SweepError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ConnectFailed { .. } => {
                Some("Check `database.url` in the configuration or pass --database.")
            }
            Self::MissingParentKey { .. } => Some("Pass the key of a persisted record."),
            Self::InvalidIdentifier { .. } => {
                Some("Table and column names must be non-empty and free of NUL bytes.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database { .. } | Self::ConnectFailed { .. } | Self::TransactionFailed { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Database { .. } => "sweep.database",
            Self::ConnectFailed { .. } => "sweep.connect_failed",
            Self::TransactionFailed { .. } => "sweep.transaction_failed",
            Self::MissingParentKey { .. } => "sweep.missing_parent_key",
            Self::InvalidIdentifier { .. } => "sweep.invalid_identifier",
        };
        Some(code)
    }
}
