//! Error types shared by the API client and the session manager.

use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;
use crate::token::TokenError;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while talking to the signage backend.
///
/// The variants follow the failure categories a caller has to tell apart:
///
/// | Variant     | Meaning                                                  |
/// |-------------|----------------------------------------------------------|
/// | `Transport` | no response at all (connection refused, DNS, TLS, ...)   |
/// | `Api`       | the backend answered with a non-success status           |
/// | `Decode`    | the backend answered 2xx but the body has the wrong shape|
/// | `Token`     | a bearer token could not be decoded                      |
/// | `Storage`   | the durable client storage failed                        |
/// | `Config`    | the client was configured with an unusable base URL      |
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}{}", detail_suffix(.detail))]
    Api {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of the response, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Structured `detail` message sent by the backend, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True for the authentication rejection that invalidates the session.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

/// User-facing failure returned by [`SessionManager`](crate::SessionManager)
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub message: String,
}

impl AuthFailure {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
