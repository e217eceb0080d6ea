//! Dialect of server 1.32 to 1.49.
//!
//! The decimal mark moved to the `asdecimalmark` string and styles gained
//! an `asrounding` field, which the client does not use.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use ledgersync_shared::types::ApiVersion;

use super::dialect::ApiDialect;
use super::error::ProtocolError;
use super::quantity::WireStyle;
use super::wire;
use crate::model::{AccountNode, Transaction};

/// Amount style of this revision.
#[derive(Debug, Deserialize)]
pub struct Style {
    ascommodityside: Option<char>,
    #[serde(default)]
    ascommodityspaced: bool,
    asprecision: Option<u32>,
    asdecimalmark: Option<String>,
}

impl WireStyle for Style {
    fn commodity_side(&self) -> Option<char> {
        self.ascommodityside
    }

    fn commodity_spaced(&self) -> bool {
        self.ascommodityspaced
    }

    fn precision(&self) -> Option<u32> {
        self.asprecision
    }

    fn decimal_mark(&self) -> Option<String> {
        self.asdecimalmark.clone()
    }
}

/// Decoder for 1.32 and 1.40 payloads.
#[derive(Debug)]
pub struct Dialect {
    version: ApiVersion,
}

impl Dialect {
    /// Creates the dialect for one of the revisions sharing this shape.
    #[must_use]
    pub const fn new(version: ApiVersion) -> Self {
        Self { version }
    }
}

impl ApiDialect for Dialect {
    fn version(&self) -> ApiVersion {
        self.version
    }

    fn decode_accounts(
        &self,
        bytes: &[u8],
        cancel: &CancellationToken,
        sink: &mut dyn FnMut(AccountNode) -> Result<(), ProtocolError>,
    ) -> Result<usize, ProtocolError> {
        wire::decode_flat_accounts::<Style>(bytes, cancel, sink)
    }

    fn decode_transactions(
        &self,
        bytes: &[u8],
        cancel: &CancellationToken,
        sink: &mut dyn FnMut(Transaction) -> Result<(), ProtocolError>,
    ) -> Result<usize, ProtocolError> {
        wire::decode_transactions::<Style>(bytes, cancel, sink)
    }
}
