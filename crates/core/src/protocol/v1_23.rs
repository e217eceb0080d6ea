//! Dialect of server 1.23 to 1.31.
//!
//! Precision is a plain integer again, with `null` standing for natural
//! precision. The decimal mark is still the `asdecimalpoint` character.

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
    asdecimalpoint: Option<char>,
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
        self.asdecimalpoint.map(String::from)
    }
}

/// Decoder for 1.23 payloads.
#[derive(Debug)]
pub struct Dialect;

impl ApiDialect for Dialect {
    fn version(&self) -> ApiVersion {
        ApiVersion::V1_23
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
