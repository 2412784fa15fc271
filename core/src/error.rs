//! Error types for the todo API client.
//!
//! # Design
//! Three families share one enum so every failure reaches callers through a
//! single `Result` channel:
//! - transport failures (`Transport`, `Timeout`): the backend was never
//!   reached or never answered;
//! - envelope failures (`Envelope`): the backend answered with a code outside
//!   the success set;
//! - fatal envelope codes (`NotFound`, `Server`): like `Envelope`, but the UI
//!   shell is expected to show an error page. The client only reports the
//!   target through [`ApiError::redirect`]; it never navigates.
//!
//! Envelope-derived variants display as the bare backend message so the
//! notification layer can show it verbatim.

use thiserror::Error;

use crate::routes::Route;
use crate::types::TodoId;

/// Message used when the backend rejects a request without saying why.
pub const FALLBACK_MESSAGE: &str = "Request failed";

/// Errors returned by `TodoClient` parse methods, transports and the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The backend could not be reached or the connection failed mid-flight.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// The envelope carried a code outside the success set.
    #[error("{msg}")]
    Envelope { code: i64, msg: String },

    /// Envelope code 404: the requested todo does not exist.
    #[error("{msg}")]
    NotFound { msg: String },

    /// Envelope code 500: the backend failed internally.
    #[error("{msg}")]
    Server { msg: String },

    /// The response was not an envelope and the HTTP status was not 2xx.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request URL could not be assembled.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Input rejected before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A list-local action targeted an id that is not on the current page.
    #[error("todo {0} is not on the current page")]
    NotInList(TodoId),
}

impl ApiError {
    /// Build the error for a rejected envelope, choosing the fatal variants
    /// for codes 404 and 500.
    pub fn from_envelope(code: i64, msg: Option<String>) -> Self {
        let msg = msg
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
        match code {
            404 => ApiError::NotFound { msg },
            500 => ApiError::Server { msg },
            _ => ApiError::Envelope { code, msg },
        }
    }

    /// Error page the UI shell should navigate to, if any.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            ApiError::NotFound { .. } => Some(Route::NotFound),
            ApiError::Server { .. } => Some(Route::ServerError),
            _ => None,
        }
    }

    /// True for failures where the backend never produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Timeout { .. })
    }
}
