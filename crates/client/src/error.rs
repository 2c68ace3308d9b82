//! Structured client errors.
//!
//! Every failure surfaced by the request layer carries a string code from a
//! fixed taxonomy, mirrored by [`ApiError::code`]:
//!
//! | Code                  | Meaning                                        |
//! |-----------------------|------------------------------------------------|
//! | `HTTP_ERROR_<status>` | backend failure status with a decodable body   |
//! | `UNKNOWN_ERROR`       | backend failure status, body undecodable       |
//! | `CLIENT_ERROR`        | failure before/without a server response       |
//! | `TIMEOUT_ERROR`       | the local timeout elapsed first                |
//! | `NETWORK_ERROR`       | transport failure during an upload             |
//! | `DOWNLOAD_ERROR`      | transport or file failure during a download    |
//!
//! Backends may supply their own `code` (e.g. `UNAUTHORIZED`), which passes
//! through unchanged.

use serde::Deserialize;
use sidequest_core::error::CoreError;

/// Error envelope the backend attaches to failure responses.
///
/// Route handlers are inconsistent about the message key (`message` vs
/// `error`); both are accepted here and `message` wins when both appear.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Structured error for every client operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend returned a non-success status.
    #[error("{message}")]
    Http {
        status: u16,
        /// Taxonomy code; `HTTP_ERROR_<status>` unless the body supplied one.
        code: String,
        message: String,
    },

    /// The configured timeout elapsed before the request settled.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// A failure raised before or without a server response.
    #[error("{0}")]
    Client(String),

    /// Transport failure while uploading a file.
    #[error("Network error during upload: {0}")]
    Network(String),

    /// Transport or filesystem failure while downloading a file.
    #[error("File download failed: {0}")]
    Download(String),

    /// A success body did not match the endpoint's response schema.
    #[error("Response from {endpoint} did not match the expected schema: {detail}")]
    Schema { endpoint: String, detail: String },
}

impl ApiError {
    /// Build the error for a non-success response.
    ///
    /// `body` is `None` when the failure body could not be decoded; that case
    /// gets the generic `UNKNOWN_ERROR` shape rather than propagating the
    /// decode failure.
    pub fn from_status(status: u16, body: Option<ErrorBody>) -> Self {
        match body {
            Some(body) => {
                let message = body
                    .message
                    .or(body.error)
                    .unwrap_or_else(|| format!("Request failed with status {status}"));
                let code = body.code.unwrap_or_else(|| format!("HTTP_ERROR_{status}"));
                ApiError::Http {
                    status,
                    code,
                    message,
                }
            }
            None => ApiError::Http {
                status,
                code: "UNKNOWN_ERROR".to_string(),
                message: "Unknown error occurred".to_string(),
            },
        }
    }

    /// The taxonomy code for this error.
    pub fn code(&self) -> String {
        match self {
            ApiError::Http { code, .. } => code.clone(),
            ApiError::Timeout { .. } => "TIMEOUT_ERROR".to_string(),
            ApiError::Client(_) | ApiError::Schema { .. } => "CLIENT_ERROR".to_string(),
            ApiError::Network(_) => "NETWORK_ERROR".to_string(),
            ApiError::Download(_) => "DOWNLOAD_ERROR".to_string(),
        }
    }

    /// The HTTP status, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure means the session token was rejected.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ApiError::Http { status, code, .. } => *status == 401 || code == "UNAUTHORIZED",
            _ => false,
        }
    }
}

impl From<CoreError> for ApiError {
    /// Domain validation failures are client-side by definition.
    fn from(err: CoreError) -> Self {
        ApiError::Client(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Client(format!("Request failed: {err}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
