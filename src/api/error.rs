//! Structured API errors
//!
//! Every failure coming out of the API layer is an [`ApiError`]: the same
//! `{error, error_code, message}` object the looking-glass server returns on
//! non-success responses, or a synthesized one when the body cannot be read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Code used when a response body cannot be decoded as JSON
pub const JSON_ERROR_DECODE_FAILED: &str = "JSON_ERROR_DECODE_FAILED";

/// Code used when the request never produced an HTTP response
pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

/// Code used when query options cannot be turned into a query string
pub const INVALID_QUERY: &str = "INVALID_QUERY";

/// Code the server uses for an invalid IP address, hostname or prefix
pub const INVALID_HOST: &str = "INV_HOST";

/// Code the server uses when a ping/trace request names no host
pub const NO_HOST: &str = "NO_HOST";

/// Code the server uses for a protocol other than `any`, `ipv4` or `ipv6`
pub const INVALID_PROTO: &str = "INV_PROTO";

/// Code used when a ping/trace request is still unfinished after the wait bound
pub const TIMED_OUT: &str = "LG_TIMEOUT";

/// Error object as returned by the API, also used as the store's error state
///
/// The default value is the cleared state (`error == false`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub error: bool,

    #[serde(default, alias = "err_code")]
    pub error_code: String,

    #[serde(default)]
    pub message: String,
}

impl ApiError {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            error_code: error_code.into(),
            message: message.into(),
        }
    }

    /// The error synthesized when a body fails to decode
    pub fn decode_failed() -> Self {
        Self::new(JSON_ERROR_DECODE_FAILED, "Unknown error occurred")
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(REQUEST_FAILED, message)
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(INVALID_QUERY, message)
    }

    pub fn invalid_host(address: &str) -> Self {
        Self::new(INVALID_HOST, format!("IP / Prefix '{}' is invalid.", address))
    }

    pub fn no_host() -> Self {
        Self::new(NO_HOST, "No IP Address / Hostname specified")
    }

    pub fn invalid_proto(proto: &str) -> Self {
        Self::new(
            INVALID_PROTO,
            format!(
                "Invalid IP protocol '{}', choose one of 'any', 'ipv4', 'ipv6'",
                proto
            ),
        )
    }

    pub fn timed_out(req_id: &str, waited_ms: u128) -> Self {
        Self::new(
            TIMED_OUT,
            format!("request {} not finished after {} ms", req_id, waited_ms),
        )
    }

    /// Decode the body of a non-success response into an error
    ///
    /// Bodies that are not a JSON object, or that decode to an object which
    /// does not flag itself as an error, collapse into [`ApiError::decode_failed`].
    pub fn from_error_body(body: &str) -> Self {
        match serde_json::from_str::<ApiError>(body) {
            Ok(err) if err.error => err,
            _ => Self::decode_failed(),
        }
    }

    pub fn is_cleared(&self) -> bool {
        !self.error
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error_code.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "[{}] {}", self.error_code, self.message)
        }
    }
}

impl std::error::Error for ApiError {}
