//! Balancing error types.

use std::fmt;

use ledgersync_shared::AppError;
use ledgersync_shared::types::RowId;
use thiserror::Error;

/// Why a transaction cannot be submitted yet.
///
/// Reasons are checked in declaration order; the first failing one is
/// reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotSubmittable {
    /// The description is blank.
    MissingDescription,
    /// Fewer than two rows name an account.
    TooFewAccounts {
        /// Rows with a non-blank account name.
        accounts: usize,
    },
    /// A row with an account has amount text that is not a number.
    InvalidAmount {
        /// Zero-based row position.
        row: usize,
    },
    /// A row without an account has an amount.
    AmountWithoutAccount {
        /// Zero-based row position.
        row: usize,
    },
    /// A currency does not balance and has no single receiver.
    Unbalanced {
        /// Currency code, possibly empty.
        currency: String,
        /// Rows with an account but no amount in that currency.
        receivers: usize,
    },
}

impl fmt::Display for NotSubmittable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDescription => write!(f, "missing description"),
            Self::TooFewAccounts { accounts } => {
                write!(f, "needs at least two accounts, has {accounts}")
            }
            Self::InvalidAmount { row } => write!(f, "row {} has an invalid amount", row + 1),
            Self::AmountWithoutAccount { row } => {
                write!(f, "row {} has an amount but no account", row + 1)
            }
            Self::Unbalanced { currency, receivers: 0 } => {
                write!(f, "'{currency}' does not balance and no row can receive the difference")
            }
            Self::Unbalanced { currency, receivers } => write!(
                f,
                "'{currency}' does not balance and {receivers} rows could receive the difference"
            ),
        }
    }
}

/// Errors raised by the balancing engine and edit sessions.
#[derive(Debug, Error)]
pub enum BalancingError {
    /// Amount text that does not parse reached submission.
    #[error("Invalid amount text: '{text}'")]
    InvalidAmountText {
        /// The offending text.
        text: String,
    },

    /// The transaction is not ready for submission.
    #[error("Transaction not submittable: {0}")]
    NotSubmittable(NotSubmittable),

    /// A state the check should have ruled out was reached.
    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    /// An edit was attempted while another edit was being published.
    #[error("Transaction is already being updated")]
    ReentrantUpdate,

    /// No row has the given identifier.
    #[error("Row {0} not found")]
    RowNotFound(RowId),

    /// A row position is past the end of the list.
    #[error("Row position {position} out of range for {len} rows")]
    RowOutOfRange {
        /// Requested position.
        position: usize,
        /// Current number of rows.
        len: usize,
    },

    /// A previous edit panicked while holding the session state.
    #[error("Edit session state is poisoned")]
    StatePoisoned,
}

impl BalancingError {
    /// Returns the error code for logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmountText { .. } => "INVALID_AMOUNT_TEXT",
            Self::NotSubmittable(_) => "NOT_SUBMITTABLE",
            Self::InternalInvariantViolation(_) => "INTERNAL_INVARIANT_VIOLATION",
            Self::ReentrantUpdate => "REENTRANT_UPDATE",
            Self::RowNotFound(_) => "ROW_NOT_FOUND",
            Self::RowOutOfRange { .. } => "ROW_OUT_OF_RANGE",
            Self::StatePoisoned => "STATE_POISONED",
        }
    }

    /// Returns true for programming errors that must abort the operation.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InternalInvariantViolation(_) | Self::StatePoisoned
        )
    }
}

impl From<BalancingError> for AppError {
    fn from(err: BalancingError) -> Self {
        match err {
            BalancingError::InvalidAmountText { .. } | BalancingError::NotSubmittable(_) => {
                Self::NotSubmittable(err.to_string())
            }
            BalancingError::InternalInvariantViolation(_)
            | BalancingError::ReentrantUpdate
            | BalancingError::RowNotFound(_)
            | BalancingError::RowOutOfRange { .. }
            | BalancingError::StatePoisoned => Self::Internal(err.to_string()),
        }
    }
}
