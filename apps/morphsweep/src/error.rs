//! CLI error handling

use std::fmt;
use std::io;

use morphsweep_errors::{Error, UserFacingError};

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration or catalog error raised before touching the database
    Setup(Error),
    /// Failure while sweeping or deleting against a database
    Database {
        /// URL or path the command was connected to
        database: String,
        /// Entity label the command was working on, if any
        entity: Option<String>,
        error: Error,
    },
    /// Writing the result to stdout failed
    Output(io::Error),
}

impl CliError {
    /// Attach the database and entity a command was working on
    pub fn on<'a>(
        database: &'a str,
        entity: Option<&'a str>,
    ) -> impl FnOnce(Error) -> Self + 'a {
        move |error| CliError::Database {
            database: database.to_string(),
            entity: entity.map(str::to_string),
            error,
        }
    }
}

fn write_details(f: &mut fmt::Formatter<'_>, e: &Error) -> fmt::Result {
    if let Some(code) = e.user_code() {
        write!(f, "\n  Code: {code}")?;
    }
    if let Some(hint) = e.user_hint() {
        write!(f, "\n  Hint: {hint}")?;
    }
    if e.is_retryable() {
        write!(f, "\n  Retry: safe to retry this operation.")?;
    }
    Ok(())
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Setup(e) => {
                write!(f, "{}", e.user_message())?;
                write_details(f, e)
            }
            CliError::Database {
                database,
                entity,
                error,
            } => {
                match entity {
                    Some(entity) => write!(f, "{entity} on {database}: ")?,
                    None => write!(f, "{database}: ")?,
                }
                write!(f, "{}", error.user_message())?;
                write_details(f, error)
            }
            CliError::Output(e) => write!(f, "failed to write output: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Setup(e) | CliError::Database { error: e, .. } => Some(e),
            CliError::Output(e) => Some(e),
        }
    }
}

impl From<Error> for CliError {
    fn from(e: Error) -> Self {
        CliError::Setup(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Output(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphsweep_errors::SweepError;

    #[test]
    fn database_errors_name_their_target() {
        let error: Error = SweepError::Database {
            message: "no such table: posts".into(),
        }
        .into();
        let err = CliError::on("sqlite:app.db", Some("App\\Models\\Post"))(error);
        let text = err.to_string();
        assert!(text.starts_with("App\\Models\\Post on sqlite:app.db: "));
        assert!(text.contains("no such table: posts"));
        assert!(text.contains("Code: sweep.database"));
        assert!(text.contains("Retry: safe"));
    }

    #[test]
    fn whole_database_errors_omit_the_entity() {
        let error: Error = SweepError::MissingParentKey {
            label: "post".into(),
        }
        .into();
        let text = CliError::on("data.db", None)(error).to_string();
        assert!(text.starts_with("data.db: "));
        assert!(!text.contains("Retry"));
    }
}
