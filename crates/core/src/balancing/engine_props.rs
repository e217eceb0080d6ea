//! Property-based tests for the balancing check.
//!
//! - Property 1: A Second Check Changes Nothing
//! - Property 2: Unbalanced Currencies Need A Single Receiver
//! - Property 3: Row List Shape

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::amount_text::ParsedAmount;
use super::engine::{MIN_ROWS, check};
use super::rows::{AccountRow, EditableTransaction, TransactionHead};
use crate::model::FormatContext;

/// Strategy to generate a single row.
fn row_strategy() -> impl Strategy<Value = AccountRow> {
    (
        prop_oneof![Just(""), Just("Assets:Cash"), Just("Expenses:Food"), Just("Income")],
        prop_oneof![Just(""), Just("10"), Just("-10"), Just("2.5"), Just("-7.25"), Just("x")],
        prop_oneof![Just("USD"), Just("EUR")],
    )
        .prop_map(|(account, amount, currency)| {
            let mut row = AccountRow::new(account, currency);
            row.set_amount_text(amount, '.');
            row
        })
}

/// Strategy to generate a transaction form.
fn form_strategy() -> impl Strategy<Value = EditableTransaction> {
    (
        prop_oneof![Just(String::new()), Just("lunch".to_string())],
        prop::collection::vec(row_strategy(), 0..7),
    )
        .prop_map(|(description, rows)| EditableTransaction {
            head: TransactionHead {
                description,
                ..TransactionHead::default()
            },
            rows,
        })
}

fn ctx() -> FormatContext {
    FormatContext {
        default_currency: "USD".into(),
        ..FormatContext::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// **Property 1: A Second Check Changes Nothing**
    ///
    /// *For any* form, checking the normalized result again yields the same
    /// rows, the same hints and the same verdict.
    #[test]
    fn prop_check_is_idempotent(form in form_strategy()) {
        let first = check(&form, &ctx());
        let second = check(&first.transaction, &ctx());
        prop_assert!(!second.changed);
        prop_assert_eq!(&second.transaction, &first.transaction);
        prop_assert_eq!(second.reason, first.reason);
    }

    /// **Property 2: Unbalanced Currencies Need A Single Receiver**
    ///
    /// *For any* submittable form, every currency with a non-zero sum has
    /// exactly one row with an account and a blank amount.
    #[test]
    fn prop_submittable_has_single_receivers(form in form_strategy()) {
        let result = check(&form, &ctx());
        prop_assume!(result.is_submittable());

        let rows = &result.transaction.rows;
        for currency in ["USD", "EUR"] {
            let in_currency = rows.iter().filter(|r| r.currency == currency);
            let sum: Decimal = in_currency.clone().filter_map(|r| r.amount().value()).sum();
            let receivers = in_currency
                .filter(|r| !r.has_blank_account() && r.amount() == ParsedAmount::Unset)
                .count();
            if !sum.is_zero() {
                prop_assert_eq!(receivers, 1);
            }
        }
    }

    /// **Property 3: Row List Shape**
    ///
    /// *For any* form, the normalized list has at least the minimum number
    /// of rows, only the physically last row is flagged, and row identities
    /// of non-placeholder rows survive.
    #[test]
    fn prop_row_list_shape(form in form_strategy()) {
        let result = check(&form, &ctx());
        let rows = &result.transaction.rows;

        prop_assert!(rows.len() >= MIN_ROWS);
        let flagged: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_last)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(flagged, vec![rows.len() - 1]);

        for original in form.rows.iter().filter(|r| !r.is_placeholder()) {
            prop_assert!(result.transaction.row(original.id()).is_some());
        }
    }
}
