//! Amount text typed by the user.
//!
//! Accepted input is an optional sign, digits, and at most one decimal
//! separator of the active profile. Digit grouping is not accepted.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Result of parsing an amount field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsedAmount {
    /// The field is blank.
    #[default]
    Unset,
    /// The field holds a number.
    Valid(Decimal),
    /// The field holds text that is not a number.
    Invalid,
}

impl ParsedAmount {
    /// True unless the field is blank.
    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// True for text that failed to parse.
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// The parsed number, if any.
    #[must_use]
    pub const fn value(self) -> Option<Decimal> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Unset | Self::Invalid => None,
        }
    }
}

/// Parses amount text using `separator` as decimal separator.
#[must_use]
pub fn parse_amount(text: &str, separator: char) -> ParsedAmount {
    let text = text.trim();
    if text.is_empty() {
        return ParsedAmount::Unset;
    }

    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let mut normalized = String::with_capacity(unsigned.len() + 1);
    if negative {
        normalized.push('-');
    }
    let mut digits = 0usize;
    let mut separators = 0usize;
    for c in unsigned.chars() {
        if c.is_ascii_digit() {
            digits += 1;
            normalized.push(c);
        } else if c == separator {
            separators += 1;
            normalized.push('.');
        } else {
            return ParsedAmount::Invalid;
        }
    }
    if digits == 0 || separators > 1 {
        return ParsedAmount::Invalid;
    }
    if normalized.ends_with('.') {
        normalized.pop();
    }

    Decimal::from_str(&normalized).map_or(ParsedAmount::Invalid, ParsedAmount::Valid)
}

/// Formats a balancing hint: at least two decimals, no grouping, the
/// profile's decimal separator.
#[must_use]
pub fn format_hint(value: Decimal, separator: char) -> String {
    let mut value = value.normalize();
    value.rescale(value.scale().max(2));
    let text = value.to_string();
    if separator == '.' {
        text
    } else {
        text.replacen('.', &separator.to_string(), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("10", '.', ParsedAmount::Valid(dec!(10)))]
    #[case(" -10.5 ", '.', ParsedAmount::Valid(dec!(-10.5)))]
    #[case("+3", '.', ParsedAmount::Valid(dec!(3)))]
    #[case("12,75", ',', ParsedAmount::Valid(dec!(12.75)))]
    #[case(".5", '.', ParsedAmount::Valid(dec!(0.5)))]
    #[case("7.", '.', ParsedAmount::Valid(dec!(7)))]
    #[case("", '.', ParsedAmount::Unset)]
    #[case("   ", '.', ParsedAmount::Unset)]
    #[case("-", '.', ParsedAmount::Invalid)]
    #[case("1.2.3", '.', ParsedAmount::Invalid)]
    #[case("12,75", '.', ParsedAmount::Invalid)]
    #[case("1,000.00", '.', ParsedAmount::Invalid)]
    #[case("abc", '.', ParsedAmount::Invalid)]
    #[case("--1", '.', ParsedAmount::Invalid)]
    fn test_parse_amount(#[case] text: &str, #[case] separator: char, #[case] expected: ParsedAmount) {
        assert_eq!(parse_amount(text, separator), expected);
    }

    #[test]
    fn test_parse_amount_overflow_is_invalid() {
        assert_eq!(
            parse_amount("99999999999999999999999999999999", '.'),
            ParsedAmount::Invalid
        );
    }

    #[rstest]
    #[case(dec!(-10), '.', "-10.00")]
    #[case(dec!(5), '.', "5.00")]
    #[case(dec!(-5.125), '.', "-5.125")]
    #[case(dec!(1234.5), ',', "1234,50")]
    #[case(dec!(-0.10), '.', "-0.10")]
    fn test_format_hint(#[case] value: Decimal, #[case] separator: char, #[case] expected: &str) {
        assert_eq!(format_hint(value, separator), expected);
    }

    #[test]
    fn test_parsed_amount_accessors() {
        assert!(!ParsedAmount::Unset.is_set());
        assert!(ParsedAmount::Invalid.is_set());
        assert!(ParsedAmount::Invalid.is_invalid());
        assert_eq!(ParsedAmount::Valid(dec!(1)).value(), Some(dec!(1)));
        assert_eq!(ParsedAmount::Invalid.value(), None);
    }
}
