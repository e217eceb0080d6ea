//! Currency-tagged amounts.

use rust_decimal::Decimal;

use super::context::FormatContext;
use super::style::AmountStyle;

/// A magnitude tagged with a currency code and an optional display style.
///
/// The currency may be empty for commodity-less values. A missing style
/// falls back to the profile default at format time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledAmount {
    /// Currency code, possibly empty.
    pub currency: String,
    /// The value.
    pub magnitude: Decimal,
    /// Style reported by the server, if any.
    pub style: Option<AmountStyle>,
}

impl StyledAmount {
    /// Creates an amount without a style.
    #[must_use]
    pub fn new(magnitude: Decimal, currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            magnitude,
            style: None,
        }
    }

    /// Attaches a display style.
    #[must_use]
    pub fn with_style(mut self, style: AmountStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// The style used for rendering.
    #[must_use]
    pub fn effective_style(&self, ctx: &FormatContext) -> AmountStyle {
        self.style
            .clone()
            .unwrap_or_else(|| ctx.default_style(&self.currency))
    }

    /// Renders the amount with its symbol.
    #[must_use]
    pub fn format(&self, ctx: &FormatContext) -> String {
        self.effective_style(ctx)
            .format(self.magnitude, &self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgersync_shared::types::CurrencyPosition;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_uses_own_style() {
        let amount = StyledAmount::new(dec!(42.5), "EUR").with_style(AmountStyle {
            position: CurrencyPosition::After,
            spaced: true,
            precision: 2,
            decimal_mark: ",".into(),
        });
        assert_eq!(amount.format(&FormatContext::default()), "42,50 EUR");
    }

    #[test]
    fn test_format_falls_back_to_context() {
        let ctx = FormatContext {
            currency_spaced: true,
            ..FormatContext::default()
        };
        let amount = StyledAmount::new(dec!(7), "USD");
        assert_eq!(amount.format(&ctx), "USD 7.00");
    }

    #[test]
    fn test_format_without_currency() {
        let amount = StyledAmount::new(dec!(-3.1), "");
        assert_eq!(amount.format(&FormatContext::default()), "-3.10");
    }
}
