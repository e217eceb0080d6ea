//! Protocol normalization.
//!
//! This module isolates every server-revision-specific detail:
//! - One sibling dialect per supported API revision
//! - Incremental JSON array decoding with per-record cancellation
//! - Account tree assembly with ancestor synthesis
//! - Background decoding streams
//! - The request body for posting transactions

pub mod dialect;
pub mod error;
pub mod json;
pub mod quantity;
pub mod stream;
pub mod tree;
pub mod v1_14;
pub mod v1_19_1;
pub mod v1_23;
pub mod v1_32;
pub mod v1_50;
pub mod wire;

#[cfg(test)]
mod tree_props;

use tokio_util::sync::CancellationToken;
use tracing::info;

use ledgersync_shared::types::ApiVersion;

use crate::model::{AccountTree, FormatContext, Transaction};

pub use dialect::{ApiDialect, dialect_for};
pub use error::ProtocolError;
pub use stream::{RecordStream, collect_transactions, collect_tree, stream_accounts, stream_transactions};
pub use tree::TreeBuilder;

/// Decodes an accounts payload into a tree on the calling thread.
///
/// # Errors
///
/// Returns the first decode or tree error; no partial tree is returned.
pub fn decode_account_tree(
    bytes: &[u8],
    version: ApiVersion,
    cancel: &CancellationToken,
) -> Result<AccountTree, ProtocolError> {
    let mut builder = TreeBuilder::new();
    let records = dialect_for(version)?.decode_accounts(bytes, cancel, &mut |node| builder.insert(node))?;
    let tree = builder.finish();
    info!(%version, records, accounts = tree.len(), "accounts decoded");
    Ok(tree)
}

/// Decodes a transactions payload on the calling thread.
///
/// # Errors
///
/// Returns the first decode error; no partial list is returned.
pub fn decode_transactions(
    bytes: &[u8],
    version: ApiVersion,
    cancel: &CancellationToken,
) -> Result<Vec<Transaction>, ProtocolError> {
    let mut transactions = Vec::new();
    dialect_for(version)?.decode_transactions(bytes, cancel, &mut |tx| {
        transactions.push(tx);
        Ok(())
    })?;
    info!(%version, transactions = transactions.len(), "transactions decoded");
    Ok(transactions)
}

/// Encodes a finished transaction for posting.
///
/// # Errors
///
/// Returns `ProtocolError::EncodingUnsupported` for revisions other than the
/// newest, or `ProtocolError::UnsupportedVersion` for sentinels.
pub fn encode_transaction(
    transaction: &Transaction,
    version: ApiVersion,
    ctx: &FormatContext,
) -> Result<Vec<u8>, ProtocolError> {
    dialect_for(version)?.encode_transaction(transaction, ctx)
}
