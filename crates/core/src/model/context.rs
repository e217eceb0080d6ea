//! Explicit formatting context.
//!
//! Everything that used to come from "the current profile" is passed in
//! through this value: the decimal separator users type, the default
//! currency for new rows, and where the profile puts currency symbols.

use ledgersync_shared::config::ProfileConfig;
use ledgersync_shared::types::CurrencyPosition;

use super::style::AmountStyle;

/// Per-profile settings consulted by formatting, parsing and encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatContext {
    /// Decimal separator accepted in typed amounts and used for hints.
    pub decimal_separator: char,
    /// Currency assigned to rows created without one.
    pub default_currency: String,
    /// Symbol position for amounts the server sent without a style.
    pub currency_position: CurrencyPosition,
    /// Whether a space separates symbol and number in default styles.
    pub currency_spaced: bool,
}

impl Default for FormatContext {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            default_currency: String::new(),
            currency_position: CurrencyPosition::Before,
            currency_spaced: false,
        }
    }
}

impl FormatContext {
    /// Style used for an amount that arrived without one.
    ///
    /// An empty currency never gets a symbol position.
    #[must_use]
    pub fn default_style(&self, currency: &str) -> AmountStyle {
        let position = if currency.is_empty() {
            CurrencyPosition::None
        } else {
            self.currency_position
        };
        AmountStyle {
            position,
            spaced: self.currency_spaced,
            precision: AmountStyle::DEFAULT_PRECISION,
            decimal_mark: self.decimal_separator.to_string(),
        }
    }
}

impl From<&ProfileConfig> for FormatContext {
    fn from(profile: &ProfileConfig) -> Self {
        Self {
            decimal_separator: profile.decimal_separator,
            default_currency: profile.default_currency.clone(),
            currency_position: profile.currency_position,
            currency_spaced: profile.currency_gap,
        }
    }
}
