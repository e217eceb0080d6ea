//! Quantities and styles as the server writes them.
//!
//! Every dialect reports quantities the same way; styles differ per
//! revision and are unified through [`WireStyle`].

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use ledgersync_shared::types::CurrencyPosition;

use super::error::ProtocolError;
use crate::model::AmountStyle;

/// A quantity: `{decimalMantissa, decimalPlaces, floatingPoint}`.
///
/// Mantissa and places are authoritative; the float is only a fallback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireQuantity {
    /// Integer mantissa.
    #[serde(rename = "decimalMantissa")]
    pub decimal_mantissa: Option<i64>,
    /// Number of decimal places of the mantissa.
    #[serde(rename = "decimalPlaces")]
    pub decimal_places: Option<u32>,
    /// Approximate value.
    #[serde(rename = "floatingPoint")]
    pub floating_point: Option<f64>,
}

impl WireQuantity {
    /// Converts to an exact decimal.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Decode` if the scale is out of range or the
    /// float fallback is not a finite number.
    pub fn to_decimal(&self) -> Result<Decimal, ProtocolError> {
        match (self.decimal_mantissa, self.decimal_places) {
            (Some(mantissa), Some(places)) => {
                Decimal::try_from_i128_with_scale(i128::from(mantissa), places).map_err(|e| {
                    ProtocolError::Decode(format!(
                        "quantity {mantissa}e-{places} out of range: {e}"
                    ))
                })
            }
            (Some(mantissa), None) => Ok(Decimal::from(mantissa)),
            (None, _) => match self.floating_point {
                Some(value) => Decimal::from_str(&value.to_string()).map_err(|e| {
                    ProtocolError::Decode(format!("quantity {value} is not a number: {e}"))
                }),
                None => Ok(Decimal::ZERO),
            },
        }
    }
}

/// Converts an optional quantity; a null quantity is zero.
///
/// # Errors
///
/// See [`WireQuantity::to_decimal`].
pub fn quantity_or_zero(quantity: Option<&WireQuantity>) -> Result<Decimal, ProtocolError> {
    quantity.map_or(Ok(Decimal::ZERO), WireQuantity::to_decimal)
}

/// Common view over the per-revision style objects.
pub trait WireStyle {
    /// Commodity side marker, `L` or `R`.
    fn commodity_side(&self) -> Option<char>;

    /// Whether symbol and number are spaced.
    fn commodity_spaced(&self) -> bool;

    /// Display precision; `None` means natural precision.
    fn precision(&self) -> Option<u32>;

    /// Decimal mark.
    fn decimal_mark(&self) -> Option<String>;

    /// Builds the canonical style for an amount in `commodity`.
    fn to_style(&self, commodity: &str) -> AmountStyle {
        AmountStyle {
            position: CurrencyPosition::from_commodity_side(self.commodity_side(), commodity),
            spaced: self.commodity_spaced(),
            precision: self.precision().unwrap_or(AmountStyle::DEFAULT_PRECISION),
            decimal_mark: self
                .decimal_mark()
                .filter(|mark| !mark.is_empty())
                .unwrap_or_else(|| ".".to_string()),
        }
    }
}
