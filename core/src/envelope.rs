//! The `{code, msg, data}` wrapper around every backend response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Envelope codes treated as success.
pub const SUCCESS_CODES: [i64; 3] = [200, 201, 204];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        SUCCESS_CODES.contains(&self.code)
    }

    /// Check the code and hand back `data`, which may legitimately be absent.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::from_envelope(self.code, self.msg))
        }
    }
}

/// Parse a raw body as an envelope without interpreting `data`.
///
/// Returns `None` when the body is not an envelope at all, so callers can
/// fall back to the HTTP status.
pub(crate) fn peek(body: &str) -> Option<Envelope<serde_json::Value>> {
    serde_json::from_str(body).ok()
}

/// Unwrap an envelope whose `data` must be present.
pub(crate) fn unwrap_data<T: DeserializeOwned>(envelope: Envelope<serde_json::Value>) -> Result<T, ApiError> {
    match envelope.into_result()? {
        Some(data) => serde_json::from_value(data).map_err(|e| ApiError::DeserializationError(e.to_string())),
        None => Err(ApiError::DeserializationError("envelope has no data".to_string())),
    }
}
