//! Transaction balancing.
//!
//! This module decides whether a transaction being edited can be submitted
//! and keeps its row list tidy:
//! - Parsing of typed amounts under the profile's decimal separator
//! - Placeholder rows, last-row flag and balancing hints
//! - Receiver resolution when building the outbound transaction
//! - Edit sessions publishing snapshots to observers

pub mod amount_text;
pub mod engine;
pub mod error;
pub mod rows;
pub mod session;
pub mod submit;

#[cfg(test)]
mod engine_props;

pub use amount_text::{ParsedAmount, format_hint, parse_amount};
pub use engine::{BalanceCheck, MIN_ROWS, check};
pub use error::{BalancingError, NotSubmittable};
pub use rows::{AccountRow, EditableTransaction, TransactionHead};
pub use session::{EditSession, Observer, Snapshot};
pub use submit::to_transaction;
