//! The per-revision dialect interface and its selection.

use tokio_util::sync::CancellationToken;

use ledgersync_shared::types::ApiVersion;

use super::error::ProtocolError;
use super::{v1_14, v1_19_1, v1_23, v1_32, v1_50};
use crate::model::{AccountNode, FormatContext, Transaction};

/// Translation between one server revision's JSON and the canonical model.
///
/// Dialects are stateless siblings; none builds on another.
pub trait ApiDialect: Send + Sync {
    /// Revision this dialect was selected for.
    fn version(&self) -> ApiVersion;

    /// Streams the reported accounts of an accounts payload into `sink`.
    ///
    /// Returns the number of records read. `cancel` is checked before each
    /// record.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Decode` for malformed payloads,
    /// `ProtocolError::Cancelled` on cancellation, or the sink's error.
    fn decode_accounts(
        &self,
        bytes: &[u8],
        cancel: &CancellationToken,
        sink: &mut dyn FnMut(AccountNode) -> Result<(), ProtocolError>,
    ) -> Result<usize, ProtocolError>;

    /// Streams the transactions of a transactions payload into `sink`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiDialect::decode_accounts`].
    fn decode_transactions(
        &self,
        bytes: &[u8],
        cancel: &CancellationToken,
        sink: &mut dyn FnMut(Transaction) -> Result<(), ProtocolError>,
    ) -> Result<usize, ProtocolError>;

    /// Encodes a finished transaction as a request body.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::EncodingUnsupported` unless the revision
    /// accepts posted transactions.
    fn encode_transaction(
        &self,
        transaction: &Transaction,
        ctx: &FormatContext,
    ) -> Result<Vec<u8>, ProtocolError> {
        let _ = (transaction, ctx);
        Err(ProtocolError::EncodingUnsupported(self.version()))
    }
}

static DIALECT_1_14: v1_14::Dialect = v1_14::Dialect::new(ApiVersion::V1_14);
static DIALECT_1_15: v1_14::Dialect = v1_14::Dialect::new(ApiVersion::V1_15);
static DIALECT_1_19_1: v1_19_1::Dialect = v1_19_1::Dialect;
static DIALECT_1_23: v1_23::Dialect = v1_23::Dialect;
static DIALECT_1_32: v1_32::Dialect = v1_32::Dialect::new(ApiVersion::V1_32);
static DIALECT_1_40: v1_32::Dialect = v1_32::Dialect::new(ApiVersion::V1_40);
static DIALECT_1_50: v1_50::Dialect = v1_50::Dialect;

/// Selects the dialect for a version tag.
///
/// # Errors
///
/// Returns `ProtocolError::UnsupportedVersion` for `auto` and `html`; those
/// must be resolved before decoding and are never downgraded silently.
pub fn dialect_for(version: ApiVersion) -> Result<&'static dyn ApiDialect, ProtocolError> {
    let dialect: &'static dyn ApiDialect = match version {
        ApiVersion::V1_14 => &DIALECT_1_14,
        ApiVersion::V1_15 => &DIALECT_1_15,
        ApiVersion::V1_19_1 => &DIALECT_1_19_1,
        ApiVersion::V1_23 => &DIALECT_1_23,
        ApiVersion::V1_32 => &DIALECT_1_32,
        ApiVersion::V1_40 => &DIALECT_1_40,
        ApiVersion::V1_50 => &DIALECT_1_50,
        ApiVersion::Auto | ApiVersion::Html => {
            return Err(ProtocolError::UnsupportedVersion(version));
        }
    };
    Ok(dialect)
}
