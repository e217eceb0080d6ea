//! Protocol error types for decoding and encoding.

use ledgersync_shared::AppError;
use ledgersync_shared::types::ApiVersion;
use thiserror::Error;

/// Errors raised while translating server payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload is not valid JSON or does not have the expected shape.
    #[error("Malformed payload: {0}")]
    Decode(String),

    /// No JSON dialect exists for the version tag.
    #[error("Unsupported API version: {0}")]
    UnsupportedVersion(ApiVersion),

    /// The dialect cannot encode transactions.
    #[error("Posting transactions is not supported for API version {0}")]
    EncodingUnsupported(ApiVersion),

    /// A transaction cannot be represented in the request body.
    #[error("Cannot encode transaction: {0}")]
    Encode(String),

    /// The same account was reported twice.
    #[error("Account '{0}' already present")]
    DuplicateAccount(String),

    /// The consumer cancelled decoding.
    #[error("Decoding cancelled")]
    Cancelled,

    /// The background decoder stopped unexpectedly.
    #[error("Decoder worker failed: {0}")]
    WorkerFailed(String),
}

impl ProtocolError {
    /// Returns the error code for logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "DECODE_ERROR",
            Self::UnsupportedVersion(_) => "UNSUPPORTED_VERSION",
            Self::EncodingUnsupported(_) => "ENCODING_UNSUPPORTED",
            Self::Encode(_) => "ENCODE_ERROR",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::Cancelled => "CANCELLED",
            Self::WorkerFailed(_) => "WORKER_FAILED",
        }
    }

    /// Returns true if the fetch that produced this error must be discarded.
    ///
    /// Cancellation is requested by the caller and is not a failure.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Returns true if repeating the same call could succeed.
    ///
    /// Decoding is deterministic, so only cancelled or crashed runs qualify.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Cancelled | Self::WorkerFailed(_))
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<ProtocolError> for AppError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Cancelled => Self::Cancelled,
            ProtocolError::UnsupportedVersion(_) | ProtocolError::EncodingUnsupported(_) => {
                Self::Configuration(err.to_string())
            }
            ProtocolError::WorkerFailed(_) | ProtocolError::Encode(_) => {
                Self::Internal(err.to_string())
            }
            ProtocolError::Decode(_) | ProtocolError::DuplicateAccount(_) => {
                Self::DataLoad(err.to_string())
            }
        }
    }
}
