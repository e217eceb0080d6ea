//! Application-wide error types.
//!
//! Domain crates keep their own error enums and convert into `AppError` at
//! the boundary where a message is shown to the user.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Server data could not be loaded or decoded.
    #[error("Data load failed: {0}")]
    DataLoad(String),

    /// The edited transaction cannot be submitted yet.
    #[error("Transaction not submittable: {0}")]
    NotSubmittable(String),

    /// The operation was cancelled before it finished.
    #[error("Cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal invariant broken.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for logs and machine consumers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DataLoad(_) => "DATA_LOAD_ERROR",
            Self::NotSubmittable(_) => "NOT_SUBMITTABLE",
            Self::Cancelled => "CANCELLED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the user can fix the problem by editing and retrying.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::NotSubmittable(_) | Self::Cancelled)
    }

    /// Short message suitable for a status line.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotSubmittable(_) => "Transaction is not ready to be saved",
            Self::Cancelled => "Operation cancelled",
            Self::DataLoad(_) => "Could not load data from the server",
            Self::Configuration(_) => "Configuration is invalid",
            Self::Internal(_) => "Unexpected internal error",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
