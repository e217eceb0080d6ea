//! Dialect of server 1.19.1 to 1.22.
//!
//! Precision became a tagged value: `{"tag":"Precision","contents":2}` or
//! `{"tag":"NaturalPrecision"}`.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use ledgersync_shared::types::ApiVersion;

use super::dialect::ApiDialect;
use super::error::ProtocolError;
use super::quantity::WireStyle;
use super::wire;
use crate::model::{AccountNode, Transaction};

/// Tagged precision.
#[derive(Debug, Deserialize)]
#[serde(tag = "tag", content = "contents")]
pub enum Precision {
    /// Fixed number of decimals.
    Precision(u32),
    /// Show as many decimals as the value has.
    NaturalPrecision,
}

/// Amount style of this revision.
#[derive(Debug, Deserialize)]
pub struct Style {
    ascommodityside: Option<char>,
    #[serde(default)]
    ascommodityspaced: bool,
    asprecision: Option<Precision>,
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
        match self.asprecision {
            Some(Precision::Precision(n)) => Some(n),
            Some(Precision::NaturalPrecision) | None => None,
        }
    }

    fn decimal_mark(&self) -> Option<String> {
        self.asdecimalpoint.map(String::from)
    }
}

/// Decoder for 1.19.1 payloads.
#[derive(Debug)]
pub struct Dialect;

impl ApiDialect for Dialect {
    fn version(&self) -> ApiVersion {
        ApiVersion::V1_19_1
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
