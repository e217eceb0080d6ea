//! Property-based tests for amount styles.
//!
//! - Property 1: Persisted Style Round-Trip
//! - Property 2: Grouping Never Touches The Fraction

use proptest::prelude::*;
use rust_decimal::Decimal;

use ledgersync_shared::types::CurrencyPosition;

use super::style::AmountStyle;

/// Strategy to generate symbol positions.
fn position_strategy() -> impl Strategy<Value = CurrencyPosition> {
    prop_oneof![
        Just(CurrencyPosition::Before),
        Just(CurrencyPosition::After),
        Just(CurrencyPosition::None),
    ]
}

/// Strategy to generate valid styles.
fn style_strategy() -> impl Strategy<Value = AmountStyle> {
    (
        position_strategy(),
        any::<bool>(),
        0u32..12,
        prop_oneof![Just(".".to_string()), Just(",".to_string())],
    )
        .prop_map(|(position, spaced, precision, decimal_mark)| AmountStyle {
            position,
            spaced,
            precision,
            decimal_mark,
        })
}

/// Strategy to generate amounts with up to four decimals.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (-10_000_000_000i64..10_000_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// **Property 1: Persisted Style Round-Trip**
    ///
    /// *For any* valid style, parsing its persisted form yields the same style.
    #[test]
    fn prop_persisted_round_trip(style in style_strategy()) {
        let persisted = style.to_persisted();
        prop_assert_eq!(AmountStyle::from_persisted(&persisted), Some(style));
    }

    /// **Property 2: Grouping Never Touches The Fraction**
    ///
    /// *For any* amount and positive precision, the text after the last
    /// decimal mark has exactly `precision` digits and no group separator.
    #[test]
    fn prop_fraction_has_precision_digits(style in style_strategy(), value in amount_strategy()) {
        prop_assume!(style.precision > 0);
        let rendered = style.format_number(value);
        let (_, fraction) = rendered.rsplit_once(style.decimal_mark.as_str()).unwrap();
        prop_assert_eq!(fraction.len(), style.precision as usize);
        prop_assert!(fraction.chars().all(|c| c.is_ascii_digit()));
    }
}
