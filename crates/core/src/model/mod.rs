//! Canonical model shared by every wire dialect.
//!
//! This module implements the version-independent representation:
//! - Currency-tagged amounts and their display styles
//! - Hierarchical accounts stored as an arena
//! - Transactions and postings
//! - The explicit formatting context

pub mod account;
pub mod amount;
pub mod context;
pub mod style;
pub mod transaction;

#[cfg(test)]
mod style_props;

pub use account::{AccountAmount, AccountNode, AccountTree, parent_name_of};
pub use amount::StyledAmount;
pub use context::FormatContext;
pub use style::AmountStyle;
pub use transaction::{Posting, Transaction, TransactionStatus};
