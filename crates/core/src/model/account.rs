//! Hierarchical accounts.
//!
//! Accounts are named by colon-delimited paths. The tree is an arena of
//! nodes indexed by full name; a node's parent is found by computing the
//! prefix of its name, so there are no back-pointers.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use super::amount::StyledAmount;
use super::style::AmountStyle;

/// Separator between account name segments.
pub const ACCOUNT_DELIMITER: char = ':';

/// Returns the parent's full name, or `None` for a top-level account.
#[must_use]
pub fn parent_name_of(full_name: &str) -> Option<&str> {
    full_name
        .rfind(ACCOUNT_DELIMITER)
        .map(|pos| &full_name[..pos])
}

/// One currency bucket of an account balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountAmount {
    /// Currency code, possibly empty.
    pub currency: String,
    /// Summed magnitude.
    pub magnitude: Decimal,
    /// First style seen for this currency.
    pub style: Option<AmountStyle>,
}

/// An account with its per-currency totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNode {
    full_name: String,
    amounts: Vec<AccountAmount>,
    /// UI-only expansion flag, persisted outside the tree.
    pub expanded: bool,
    has_children: bool,
    posting_count: u64,
    synthesized: bool,
}

impl AccountNode {
    /// Creates an explicitly reported account with no amounts.
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            amounts: Vec::new(),
            expanded: false,
            has_children: false,
            posting_count: 0,
            synthesized: false,
        }
    }

    /// Creates an ancestor the server did not report.
    #[must_use]
    pub(crate) fn synthesized(full_name: impl Into<String>) -> Self {
        Self {
            synthesized: true,
            ..Self::new(full_name)
        }
    }

    /// Sets the number of postings the server counted for this account.
    #[must_use]
    pub fn with_posting_count(mut self, count: u64) -> Self {
        self.posting_count = count;
        self
    }

    /// Full colon-delimited name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Last segment of the name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.full_name
            .rsplit(ACCOUNT_DELIMITER)
            .next()
            .unwrap_or(&self.full_name)
    }

    /// Depth in the tree; top-level accounts are level 0.
    #[must_use]
    pub fn level(&self) -> usize {
        self.full_name.matches(ACCOUNT_DELIMITER).count()
    }

    /// Full name of the parent account.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        parent_name_of(&self.full_name)
    }

    /// Whether any account has this one as parent.
    #[must_use]
    pub const fn has_children(&self) -> bool {
        self.has_children
    }

    pub(crate) fn mark_has_children(&mut self) {
        self.has_children = true;
    }

    /// Postings reported for this account; zero for synthesized ancestors.
    #[must_use]
    pub const fn posting_count(&self) -> u64 {
        self.posting_count
    }

    /// True if the node was created to fill a gap in the hierarchy.
    #[must_use]
    pub const fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    /// Per-currency buckets in first-seen order.
    #[must_use]
    pub fn amounts(&self) -> &[AccountAmount] {
        &self.amounts
    }

    /// Magnitude held in one currency.
    #[must_use]
    pub fn amount(&self, currency: &str) -> Option<Decimal> {
        self.amounts
            .iter()
            .find(|a| a.currency == currency)
            .map(|a| a.magnitude)
    }

    /// Amounts as styled values for display.
    pub fn styled_amounts(&self) -> impl Iterator<Item = StyledAmount> + '_ {
        self.amounts.iter().map(|a| StyledAmount {
            currency: a.currency.clone(),
            magnitude: a.magnitude,
            style: a.style.clone(),
        })
    }

    /// Adds a magnitude to the bucket of `currency`, creating it if needed.
    ///
    /// When the bucket exists, the magnitudes are summed and its first-seen
    /// style is kept, even if that was no style at all.
    pub fn add_amount(&mut self, magnitude: Decimal, currency: &str, style: Option<AmountStyle>) {
        if let Some(bucket) = self.amounts.iter_mut().find(|a| a.currency == currency) {
            bucket.magnitude += magnitude;
        } else {
            self.amounts.push(AccountAmount {
                currency: currency.to_string(),
                magnitude,
                style,
            });
        }
    }

    /// Adds every bucket of this node to the same-currency bucket of `parent`.
    pub fn propagate_amounts_to(&self, parent: &mut Self) {
        for bucket in &self.amounts {
            parent.add_amount(bucket.magnitude, &bucket.currency, bucket.style.clone());
        }
    }

    /// Replaces the amounts and returns the previous ones.
    pub(crate) fn replace_amounts(&mut self, amounts: Vec<AccountAmount>) -> Vec<AccountAmount> {
        std::mem::replace(&mut self.amounts, amounts)
    }

    /// Turns a synthesized node into an explicitly reported one.
    pub(crate) fn mark_reported(&mut self, posting_count: u64) {
        self.synthesized = false;
        self.posting_count = posting_count;
    }
}

/// Immutable snapshot of all accounts of one fetch.
///
/// Parents always precede their children in iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountTree {
    nodes: Vec<AccountNode>,
    index: HashMap<String, usize>,
}

impl AccountTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts, synthesized ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree holds no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks an account up by full name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&AccountNode> {
        self.index.get(full_name).map(|&i| &self.nodes[i])
    }

    /// True if an account with this name exists.
    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        self.index.contains_key(full_name)
    }

    /// All accounts, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = &AccountNode> {
        self.nodes.iter()
    }

    /// Direct children of an account.
    pub fn children_of<'a>(&'a self, full_name: &'a str) -> impl Iterator<Item = &'a AccountNode> {
        self.nodes
            .iter()
            .filter(move |n| n.parent_name() == Some(full_name))
    }

    /// Parent node of an account.
    #[must_use]
    pub fn parent_of(&self, node: &AccountNode) -> Option<&AccountNode> {
        node.parent_name().and_then(|p| self.get(p))
    }

    /// Sum of posting counts reported by the server.
    #[must_use]
    pub fn total_postings(&self) -> u64 {
        self.nodes.iter().map(AccountNode::posting_count).sum()
    }

    /// Merges persisted expansion flags back into a freshly built tree.
    ///
    /// Accounts not listed are collapsed; names that no longer exist are
    /// ignored.
    pub fn restore_expanded<'a>(&mut self, expanded: impl IntoIterator<Item = &'a str>) {
        let expanded: HashSet<&str> = expanded.into_iter().collect();
        for node in &mut self.nodes {
            node.expanded = expanded.contains(node.full_name.as_str());
        }
    }

    /// Names of expanded accounts, for persisting.
    pub fn expanded_names(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|n| n.expanded)
            .map(AccountNode::full_name)
    }

    /// True if every ancestor of the account is expanded.
    #[must_use]
    pub fn is_visible(&self, node: &AccountNode) -> bool {
        let mut current = node.parent_name();
        while let Some(name) = current {
            match self.get(name) {
                Some(parent) if parent.expanded => current = parent.parent_name(),
                _ => return false,
            }
        }
        true
    }

    /// Accounts whose ancestors are all expanded.
    pub fn visible(&self) -> impl Iterator<Item = &AccountNode> {
        self.nodes.iter().filter(|n| self.is_visible(n))
    }

    pub(crate) fn position(&self, full_name: &str) -> Option<usize> {
        self.index.get(full_name).copied()
    }

    pub(crate) fn node_mut(&mut self, position: usize) -> &mut AccountNode {
        &mut self.nodes[position]
    }

    pub(crate) fn push(&mut self, node: AccountNode) -> usize {
        let position = self.nodes.len();
        self.index.insert(node.full_name.clone(), position);
        self.nodes.push(node);
        position
    }
}
