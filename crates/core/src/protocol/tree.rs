//! Account tree construction.
//!
//! Decoders emit one [`AccountNode`] per reported account; [`TreeBuilder`]
//! places them in an [`AccountTree`], synthesizing missing ancestors and
//! keeping synthesized totals equal to the sum of their descendants.

use rust_decimal::Decimal;

use super::error::ProtocolError;
use crate::model::{AccountAmount, AccountNode, AccountTree, StyledAmount, parent_name_of};

/// Name of the server's synthetic top account.
pub const ROOT_ACCOUNT: &str = "root";

/// Builds a reported account from its raw balance list.
///
/// Consecutive entries in the same currency are summed first, keeping the
/// first style of the run; the runs are then merged into per-currency
/// buckets.
#[must_use]
pub fn account_from_balances(
    name: impl Into<String>,
    posting_count: u64,
    balances: Vec<StyledAmount>,
) -> AccountNode {
    let mut runs: Vec<StyledAmount> = Vec::with_capacity(balances.len());
    for entry in balances {
        match runs.last_mut() {
            Some(last) if last.currency == entry.currency => last.magnitude += entry.magnitude,
            _ => runs.push(entry),
        }
    }

    let mut node = AccountNode::new(name).with_posting_count(posting_count);
    for run in runs {
        node.add_amount(run.magnitude, &run.currency, run.style);
    }
    node
}

/// Incrementally assembles an [`AccountTree`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: AccountTree,
}

impl TreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reported account.
    ///
    /// The synthetic root account is skipped. Missing ancestors are
    /// synthesized; the account's amounts are then added to every
    /// synthesized ancestor up to the first reported one. A report for an
    /// account that was synthesized earlier replaces its totals and only
    /// the difference travels further up.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::DuplicateAccount` if the account was already
    /// reported.
    pub fn insert(&mut self, node: AccountNode) -> Result<(), ProtocolError> {
        let name = node.full_name().to_string();
        if name.is_empty() || name == ROOT_ACCOUNT {
            return Ok(());
        }

        let delta = if let Some(position) = self.tree.position(&name) {
            let existing = self.tree.node_mut(position);
            if !existing.is_synthesized() {
                return Err(ProtocolError::DuplicateAccount(name));
            }
            existing.mark_reported(node.posting_count());
            let previous = existing.replace_amounts(node.amounts().to_vec());
            difference(node.amounts(), &previous)
        } else {
            self.ensure_ancestors(&name);
            let amounts = node.amounts().to_vec();
            self.tree.push(node);
            amounts
        };

        if let Some(parent) = parent_name_of(&name) {
            self.propagate(parent, &delta);
        }
        Ok(())
    }

    /// Number of accounts placed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// True if nothing was placed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the finished tree.
    #[must_use]
    pub fn finish(self) -> AccountTree {
        self.tree
    }

    /// Creates every missing ancestor of `name`, top-down, so that parents
    /// precede children in the arena.
    fn ensure_ancestors(&mut self, name: &str) {
        let mut missing = Vec::new();
        let mut current = parent_name_of(name);
        while let Some(parent) = current {
            if let Some(position) = self.tree.position(parent) {
                self.tree.node_mut(position).mark_has_children();
                break;
            }
            missing.push(parent);
            current = parent_name_of(parent);
        }

        for ancestor in missing.into_iter().rev() {
            let mut node = AccountNode::synthesized(ancestor);
            node.mark_has_children();
            self.tree.push(node);
        }
    }

    /// Adds `delta` to synthesized ancestors, stopping at the first
    /// reported one, whose server total already includes its subaccounts.
    fn propagate(&mut self, from: &str, delta: &[AccountAmount]) {
        let mut current = Some(from);
        while let Some(name) = current {
            let Some(position) = self.tree.position(name) else {
                break;
            };
            let ancestor = self.tree.node_mut(position);
            if !ancestor.is_synthesized() {
                break;
            }
            for bucket in delta {
                ancestor.add_amount(bucket.magnitude, &bucket.currency, bucket.style.clone());
            }
            current = parent_name_of(name);
        }
    }
}

/// Per-currency `new - old`, skipping unchanged currencies.
fn difference(new: &[AccountAmount], old: &[AccountAmount]) -> Vec<AccountAmount> {
    let mut delta: Vec<AccountAmount> = Vec::new();
    for bucket in new {
        let before = old
            .iter()
            .find(|o| o.currency == bucket.currency)
            .map_or(Decimal::ZERO, |o| o.magnitude);
        delta.push(AccountAmount {
            magnitude: bucket.magnitude - before,
            ..bucket.clone()
        });
    }
    for bucket in old {
        if !new.iter().any(|n| n.currency == bucket.currency) {
            delta.push(AccountAmount {
                magnitude: -bucket.magnitude,
                ..bucket.clone()
            });
        }
    }
    delta.retain(|d| !d.magnitude.is_zero());
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reported(name: &str, amounts: &[(&str, Decimal)]) -> AccountNode {
        account_from_balances(
            name,
            1,
            amounts
                .iter()
                .map(|(c, m)| StyledAmount::new(*m, *c))
                .collect(),
        )
    }

    #[test]
    fn test_consecutive_same_currency_entries_are_summed() {
        let node = account_from_balances(
            "Assets",
            0,
            vec![
                StyledAmount::new(dec!(1), "USD").with_style(crate::model::AmountStyle::default()),
                StyledAmount::new(dec!(2), "USD"),
                StyledAmount::new(dec!(5), "EUR"),
                StyledAmount::new(dec!(4), "USD"),
            ],
        );
        assert_eq!(node.amounts().len(), 2);
        assert_eq!(node.amount("USD"), Some(dec!(7)));
        assert_eq!(node.amount("EUR"), Some(dec!(5)));
        assert!(node.amounts()[0].style.is_some());
    }

    #[test]
    fn test_synthesizes_missing_ancestors() {
        let mut builder = TreeBuilder::new();
        builder
            .insert(reported("Assets:Cash:Checking", &[("USD", dec!(5))]))
            .unwrap();
        let tree = builder.finish();

        let names: Vec<_> = tree.iter().map(AccountNode::full_name).collect();
        assert_eq!(names, vec!["Assets", "Assets:Cash", "Assets:Cash:Checking"]);
        assert_eq!(tree.get("Assets").unwrap().amount("USD"), Some(dec!(5)));
        assert_eq!(tree.get("Assets:Cash").unwrap().amount("USD"), Some(dec!(5)));
        assert!(tree.get("Assets").unwrap().is_synthesized());
        assert!(tree.get("Assets").unwrap().has_children());
        assert!(!tree.get("Assets:Cash:Checking").unwrap().has_children());
    }

    #[test]
    fn test_synthesized_ancestor_sums_descendants() {
        let mut builder = TreeBuilder::new();
        builder.insert(reported("Assets:Cash", &[("USD", dec!(5))])).unwrap();
        builder
            .insert(reported("Assets:Bank", &[("USD", dec!(7)), ("EUR", dec!(1))]))
            .unwrap();
        let tree = builder.finish();

        let assets = tree.get("Assets").unwrap();
        assert_eq!(assets.amount("USD"), Some(dec!(12)));
        assert_eq!(assets.amount("EUR"), Some(dec!(1)));
    }

    #[test]
    fn test_reported_parent_is_not_incremented() {
        let mut builder = TreeBuilder::new();
        builder.insert(reported("Assets", &[("USD", dec!(20))])).unwrap();
        builder.insert(reported("Assets:Cash", &[("USD", dec!(5))])).unwrap();
        let tree = builder.finish();
        assert_eq!(tree.get("Assets").unwrap().amount("USD"), Some(dec!(20)));
        assert!(tree.get("Assets").unwrap().has_children());
    }

    #[test]
    fn test_late_report_replaces_synthesized_totals() {
        let mut builder = TreeBuilder::new();
        builder
            .insert(reported("Assets:Cash:Checking", &[("USD", dec!(5))]))
            .unwrap();
        builder.insert(reported("Assets:Cash", &[("USD", dec!(8))])).unwrap();
        let tree = builder.finish();

        let cash = tree.get("Assets:Cash").unwrap();
        assert!(!cash.is_synthesized());
        assert_eq!(cash.amount("USD"), Some(dec!(8)));
        assert_eq!(tree.get("Assets").unwrap().amount("USD"), Some(dec!(8)));
    }

    #[test]
    fn test_duplicate_report_is_an_error() {
        let mut builder = TreeBuilder::new();
        builder.insert(reported("Assets", &[])).unwrap();
        let err = builder.insert(reported("Assets", &[])).unwrap_err();
        assert!(matches!(err, ProtocolError::DuplicateAccount(name) if name == "Assets"));
    }

    #[test]
    fn test_root_is_skipped() {
        let mut builder = TreeBuilder::new();
        builder.insert(reported(ROOT_ACCOUNT, &[("USD", dec!(1))])).unwrap();
        assert!(builder.is_empty());
    }

    #[test]
    fn test_account_without_balances() {
        let mut builder = TreeBuilder::new();
        builder.insert(reported("Equity:Opening", &[])).unwrap();
        let tree = builder.finish();
        assert_eq!(tree.len(), 2);
        assert!(tree.get("Equity").unwrap().amounts().is_empty());
    }
}
