//! Currency symbol placement.
//!
//! The server reports a commodity side per amount style, and profiles carry a
//! preferred side used when the client builds amounts of its own.

use serde::{Deserialize, Serialize};

/// Where a currency symbol is rendered relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyPosition {
    /// Symbol before the number (e.g. "$100").
    #[default]
    Before,
    /// Symbol after the number (e.g. "100 EUR").
    After,
    /// No symbol at all.
    None,
}

impl CurrencyPosition {
    /// Returns the persisted tag for this position.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::None => "NONE",
        }
    }

    /// Parses a persisted tag; tags are case-sensitive.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "BEFORE" => Some(Self::Before),
            "AFTER" => Some(Self::After),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }

    /// Maps the server's commodity side marker (`L`/`R`) to a position.
    ///
    /// An empty commodity never shows a symbol regardless of side.
    #[must_use]
    pub fn from_commodity_side(side: Option<char>, commodity: &str) -> Self {
        if commodity.is_empty() {
            return Self::None;
        }
        match side {
            Some('L') => Self::Before,
            Some('R') => Self::After,
            _ => Self::None,
        }
    }

    /// The server's commodity side marker for this position.
    #[must_use]
    pub const fn commodity_side(self) -> char {
        match self {
            Self::After => 'R',
            Self::Before | Self::None => 'L',
        }
    }
}

impl std::fmt::Display for CurrencyPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for position in [CurrencyPosition::Before, CurrencyPosition::After, CurrencyPosition::None] {
            assert_eq!(CurrencyPosition::from_tag(position.as_tag()), Some(position));
        }
        assert_eq!(CurrencyPosition::from_tag("before"), None);
    }

    #[test]
    fn test_from_commodity_side() {
        assert_eq!(
            CurrencyPosition::from_commodity_side(Some('L'), "USD"),
            CurrencyPosition::Before
        );
        assert_eq!(
            CurrencyPosition::from_commodity_side(Some('R'), "EUR"),
            CurrencyPosition::After
        );
        assert_eq!(
            CurrencyPosition::from_commodity_side(Some('R'), ""),
            CurrencyPosition::None
        );
        assert_eq!(
            CurrencyPosition::from_commodity_side(None, "USD"),
            CurrencyPosition::None
        );
    }

    #[test]
    fn test_commodity_side() {
        assert_eq!(CurrencyPosition::Before.commodity_side(), 'L');
        assert_eq!(CurrencyPosition::After.commodity_side(), 'R');
        assert_eq!(CurrencyPosition::None.commodity_side(), 'L');
    }

    #[test]
    fn test_serde_lowercase() {
        let parsed: CurrencyPosition = serde_json::from_str("\"after\"").unwrap();
        assert_eq!(parsed, CurrencyPosition::After);
    }
}
