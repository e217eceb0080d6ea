//! Amount display styles.
//!
//! A style says where the commodity symbol goes, whether it is spaced from
//! the number, how many decimals to show and which decimal mark to use.
//! Styles are persisted as `POSITION:spaced:precision:mark`.

use rust_decimal::{Decimal, RoundingStrategy};

use ledgersync_shared::types::CurrencyPosition;

/// Display style of an amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AmountStyle {
    /// Symbol placement.
    pub position: CurrencyPosition,
    /// Whether a single space separates symbol and number.
    pub spaced: bool,
    /// Number of decimals rendered.
    pub precision: u32,
    /// Decimal mark, `.` or `,`.
    pub decimal_mark: String,
}

impl Default for AmountStyle {
    fn default() -> Self {
        Self {
            position: CurrencyPosition::Before,
            spaced: false,
            precision: Self::DEFAULT_PRECISION,
            decimal_mark: ".".to_string(),
        }
    }
}

impl AmountStyle {
    /// Precision assumed when the server does not report one.
    pub const DEFAULT_PRECISION: u32 = 2;

    const FIELD_SEPARATOR: char = ':';

    /// Serializes the style for persistence.
    ///
    /// An empty decimal mark is written as `.`.
    #[must_use]
    pub fn to_persisted(&self) -> String {
        let mark = if self.decimal_mark.is_empty() {
            "."
        } else {
            self.decimal_mark.as_str()
        };
        format!(
            "{}:{}:{}:{}",
            self.position.as_tag(),
            self.spaced,
            self.precision,
            mark
        )
    }

    /// Parses a persisted style.
    ///
    /// Returns `None` unless the input has exactly four well-formed fields.
    #[must_use]
    pub fn from_persisted(value: &str) -> Option<Self> {
        let mut fields = value.splitn(4, Self::FIELD_SEPARATOR);
        let position = CurrencyPosition::from_tag(fields.next()?)?;
        let spaced = match fields.next()? {
            "true" => true,
            "false" => false,
            _ => return None,
        };
        let precision = fields.next()?.parse::<u32>().ok()?;
        let decimal_mark = fields.next()?;
        if decimal_mark.is_empty() || decimal_mark.contains(Self::FIELD_SEPARATOR) {
            return None;
        }
        Some(Self {
            position,
            spaced,
            precision,
            decimal_mark: decimal_mark.to_string(),
        })
    }

    /// Separator placed between digit groups; never equal to the decimal mark.
    fn group_separator(&self) -> char {
        if self.decimal_mark == "," { '.' } else { ',' }
    }

    /// Renders a magnitude without any currency symbol.
    ///
    /// The integer part is grouped in threes first, then the fraction is
    /// appended after the decimal mark, so the two separators never mix.
    #[must_use]
    pub fn format_number(&self, value: Decimal) -> String {
        let near_integer = (value - value.round()).abs() < Decimal::new(1, 3);
        let rounded = if self.precision == 0 && near_integer {
            value.round()
        } else {
            value.round_dp_with_strategy(self.precision, RoundingStrategy::MidpointAwayFromZero)
        };

        let digits = rounded.abs().to_string();
        let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

        let mut out = String::with_capacity(digits.len() + integer.len() / 3 + 2);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        let separator = self.group_separator();
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                out.push(separator);
            }
            out.push(digit);
        }

        if self.precision > 0 {
            out.push_str(if self.decimal_mark.is_empty() {
                "."
            } else {
                self.decimal_mark.as_str()
            });
            out.push_str(fraction);
            for _ in fraction.len()..self.precision as usize {
                out.push('0');
            }
        }
        out
    }

    /// Renders a magnitude with its currency symbol placed per the style.
    #[must_use]
    pub fn format(&self, value: Decimal, currency: &str) -> String {
        let number = self.format_number(value);
        if currency.is_empty() {
            return number;
        }
        let gap = if self.spaced { " " } else { "" };
        match self.position {
            CurrencyPosition::Before => format!("{currency}{gap}{number}"),
            CurrencyPosition::After => format!("{number}{gap}{currency}"),
            CurrencyPosition::None => number,
        }
    }
}
