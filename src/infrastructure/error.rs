//! Infrastructure-level errors (wraps domain errors)

use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::DomainError;

/// Failures of the CircleCI API client.
///
/// Status-code failures are kept apart from transport and decode failures so
/// callers can tell "the service said no" from "we never got a usable answer".
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build the HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("failed to marshal the JSON payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to {step}: {source}")]
    Transport {
        step: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("the key {0:?} does not exist")]
    KeyNotFound(String),

    #[error("unknown error failed to {action} (HTTP {status})")]
    UnexpectedStatus { action: String, status: StatusCode },

    #[error("failed to decode HTTP response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    // reqwest embeds the request URL, which carries the token, in its message
    pub(crate) fn send(source: reqwest::Error) -> Self {
        Self::Transport {
            step: "execute HTTP request to CircleCI API",
            source: source.without_url(),
        }
    }

    pub(crate) fn read_body(source: reqwest::Error) -> Self {
        Self::Transport {
            step: "read HTTP response body",
            source: source.without_url(),
        }
    }

    /// True when the transport gave up because a timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

/// Result type for infrastructure layer operations.
pub type ApiResult<T> = Result<T, ApiError>;
