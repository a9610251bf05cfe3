//! CLI-level errors (wraps infrastructure and configuration errors)

use thiserror::Error;

use crate::config::SettingsError;
use crate::domain::DomainError;
use crate::infrastructure::ApiError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("the circle token is required (use --token or CIRCLECI_TOKEN)")]
    MissingToken,

    #[error("invalid arguments: {0}")]
    InvalidArgs(#[from] DomainError),

    #[error("cannot write output: {0}")]
    Output(#[source] std::io::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the exit code for this error.
    ///
    /// Every failure maps to the same status; callers only distinguish success from failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Api(_)
            | CliError::Settings(_)
            | CliError::MissingToken
            | CliError::InvalidArgs(_)
            | CliError::Output(_) => crate::exitcode::FAILURE,
        }
    }
}
