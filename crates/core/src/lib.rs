//! Core logic for ledgersync.
//!
//! This crate contains pure normalization and balancing logic with NO
//! network or storage dependencies. Callers hand it bytes and a version tag
//! and get canonical accounts and transactions back; editors hand it rows
//! and get a verdict and a normalized row list back.
//!
//! # Modules
//!
//! - `model` - Canonical accounts, transactions, amount styles and the
//!   explicit formatting context
//! - `protocol` - Per-revision JSON dialects, account tree assembly and
//!   background decoding streams
//! - `balancing` - Submittability rules, row normalization and edit sessions

pub mod balancing;
pub mod model;
pub mod protocol;

pub use balancing::{BalancingError, EditSession, EditableTransaction, check};
pub use model::{AccountNode, AccountTree, FormatContext, Transaction};
pub use protocol::{ApiDialect, ProtocolError, dialect_for};
