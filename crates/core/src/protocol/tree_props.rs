//! Property-based tests for account tree assembly.
//!
//! - Property 1: Parents Precede Children
//! - Property 2: Synthesized Totals Sum Their Children
//! - Property 3: Arrival Order Does Not Change Totals

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::tree::{TreeBuilder, account_from_balances};
use crate::model::{AccountNode, AccountTree, StyledAmount};

/// Strategy to generate account names up to three levels deep.
fn name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just("A"), Just("B"), Just("C")], 1..=3)
        .prop_map(|segments| segments.join(":"))
}

/// Strategy to generate a balance list in up to two currencies.
fn balances_strategy() -> impl Strategy<Value = Vec<(String, Decimal)>> {
    prop::collection::vec(
        (
            prop_oneof![Just("USD".to_string()), Just("EUR".to_string())],
            (-100_000i64..100_000i64).prop_map(|n| Decimal::new(n, 2)),
        ),
        0..3,
    )
}

/// Strategy to generate reports for distinct accounts.
fn reports_strategy() -> impl Strategy<Value = Vec<(String, Vec<(String, Decimal)>)>> {
    prop::collection::btree_set(name_strategy(), 1..8)
        .prop_flat_map(|names: BTreeSet<String>| {
            let names: Vec<String> = names.into_iter().collect();
            let count = names.len();
            (Just(names), prop::collection::vec(balances_strategy(), count))
        })
        .prop_map(|(names, balances)| names.into_iter().zip(balances).collect())
}

fn node_for(name: &str, balances: &[(String, Decimal)]) -> AccountNode {
    account_from_balances(
        name,
        1,
        balances
            .iter()
            .map(|(currency, magnitude)| StyledAmount::new(*magnitude, currency.clone()))
            .collect(),
    )
}

fn build(reports: &[(String, Vec<(String, Decimal)>)]) -> AccountTree {
    let mut builder = TreeBuilder::new();
    for (name, balances) in reports {
        builder.insert(node_for(name, balances)).unwrap();
    }
    builder.finish()
}

/// Non-zero per-currency totals of a node.
fn totals(node: &AccountNode) -> BTreeMap<String, Decimal> {
    node.amounts()
        .iter()
        .filter(|a| !a.magnitude.is_zero())
        .map(|a| (a.currency.clone(), a.magnitude))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// **Property 1: Parents Precede Children**
    ///
    /// *For any* set of reports, every non-top-level account has its parent
    /// in the tree, earlier in iteration order, marked as having children.
    #[test]
    fn prop_parents_precede_children(reports in reports_strategy()) {
        let tree = build(&reports);
        let order: Vec<&str> = tree.iter().map(AccountNode::full_name).collect();

        for (position, node) in tree.iter().enumerate() {
            if let Some(parent) = node.parent_name() {
                let parent_position = order.iter().position(|n| *n == parent);
                prop_assert!(parent_position.is_some_and(|p| p < position));
                prop_assert!(tree.get(parent).unwrap().has_children());
            }
        }
    }

    /// **Property 2: Synthesized Totals Sum Their Children**
    ///
    /// *For any* set of reports, each synthesized account holds exactly the
    /// sum of its direct children in every currency.
    #[test]
    fn prop_synthesized_totals_sum_children(reports in reports_strategy()) {
        let tree = build(&reports);

        for node in tree.iter().filter(|n| n.is_synthesized()) {
            let mut expected: BTreeMap<String, Decimal> = BTreeMap::new();
            for child in tree.children_of(node.full_name()) {
                for bucket in child.amounts() {
                    *expected.entry(bucket.currency.clone()).or_default() += bucket.magnitude;
                }
            }
            expected.retain(|_, m| !m.is_zero());
            prop_assert_eq!(totals(node), expected);
        }
    }

    /// **Property 3: Arrival Order Does Not Change Totals**
    ///
    /// *For any* set of reports, inserting them in reverse order yields the
    /// same accounts with the same totals.
    #[test]
    fn prop_arrival_order_independent(reports in reports_strategy()) {
        let forward = build(&reports);
        let mut reversed_reports = reports.clone();
        reversed_reports.reverse();
        let reversed = build(&reversed_reports);

        prop_assert_eq!(forward.len(), reversed.len());
        for node in forward.iter() {
            let other = reversed.get(node.full_name());
            prop_assert!(other.is_some());
            let other = other.unwrap();
            prop_assert_eq!(node.is_synthesized(), other.is_synthesized());
            prop_assert_eq!(totals(node), totals(other));
        }
    }
}
