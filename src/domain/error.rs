//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid identifiers, caught before any request is built.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} must not be \".\" or \"..\"")]
    DotSegment { field: &'static str },

    #[error("unknown vcs type: {0} (expected github or bitbucket)")]
    UnknownVcsType(String),
}
