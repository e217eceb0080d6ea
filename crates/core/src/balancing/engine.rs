//! Submittability check and row normalization.
//!
//! [`check`] is a pure function of the editable transaction. It returns a
//! normalized copy of the rows with refreshed balancing hints, plus the
//! first reason the transaction cannot be submitted. Running it on its own
//! output changes nothing.

use rust_decimal::Decimal;
use tracing::debug;

use super::amount_text::{ParsedAmount, format_hint};
use super::error::NotSubmittable;
use super::rows::{AccountRow, EditableTransaction, TransactionHead};
use crate::model::FormatContext;

/// Account rows never drop below this count.
pub const MIN_ROWS: usize = 2;

/// Outcome of one balancing check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceCheck {
    /// The normalized transaction.
    pub transaction: EditableTransaction,
    /// First failed rule, or `None` when submittable.
    pub reason: Option<NotSubmittable>,
    /// True if normalization changed any row.
    pub changed: bool,
}

impl BalanceCheck {
    /// True if the transaction can be submitted.
    #[must_use]
    pub const fn is_submittable(&self) -> bool {
        self.reason.is_none()
    }
}

/// Rows of one currency.
#[derive(Debug)]
struct CurrencyGroup {
    currency: String,
    blank_account: usize,
    with_amount: usize,
    receivers: Vec<usize>,
    unset_amounts: Vec<usize>,
    balance: Decimal,
}

impl CurrencyGroup {
    fn new(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            blank_account: 0,
            with_amount: 0,
            receivers: Vec::new(),
            unset_amounts: Vec::new(),
            balance: Decimal::ZERO,
        }
    }

    /// Row that should show the balancing hint.
    ///
    /// With several candidate receivers nobody gets a hint; with none, the
    /// first blank amount (usually a placeholder) does.
    fn hint_target(&self) -> Option<usize> {
        if self.balance.is_zero() {
            return None;
        }
        match self.receivers.as_slice() {
            [only] => Some(*only),
            [] => self.unset_amounts.first().copied(),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Analysis {
    groups: Vec<CurrencyGroup>,
    accounts: usize,
    any_invalid: bool,
    invalid_with_account: Option<usize>,
    amount_without_account: Option<usize>,
}

impl Analysis {
    fn of(rows: &[AccountRow]) -> Self {
        let mut analysis = Self::default();
        for (position, row) in rows.iter().enumerate() {
            let blank = row.has_blank_account();
            let amount = row.amount();

            if blank {
                if amount.is_set() && analysis.amount_without_account.is_none() {
                    analysis.amount_without_account = Some(position);
                }
            } else {
                analysis.accounts += 1;
                if amount.is_invalid() && analysis.invalid_with_account.is_none() {
                    analysis.invalid_with_account = Some(position);
                }
            }
            analysis.any_invalid |= amount.is_invalid();

            let group = analysis.group_mut(&row.currency);
            if blank {
                group.blank_account += 1;
            }
            match amount {
                ParsedAmount::Valid(value) => {
                    group.with_amount += 1;
                    group.balance += value;
                }
                ParsedAmount::Unset => {
                    group.unset_amounts.push(position);
                    if !blank {
                        group.receivers.push(position);
                    }
                }
                ParsedAmount::Invalid => {}
            }
        }
        analysis
    }

    fn group_mut(&mut self, currency: &str) -> &mut CurrencyGroup {
        let index = match self.groups.iter().position(|g| g.currency == currency) {
            Some(index) => index,
            None => {
                self.groups.push(CurrencyGroup::new(currency));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    fn reason(&self, head: &TransactionHead) -> Option<NotSubmittable> {
        if head.description.trim().is_empty() {
            return Some(NotSubmittable::MissingDescription);
        }
        if self.accounts < 2 {
            return Some(NotSubmittable::TooFewAccounts {
                accounts: self.accounts,
            });
        }
        if let Some(row) = self.invalid_with_account {
            return Some(NotSubmittable::InvalidAmount { row });
        }
        if let Some(row) = self.amount_without_account {
            return Some(NotSubmittable::AmountWithoutAccount { row });
        }
        self.groups
            .iter()
            .find(|g| !g.balance.is_zero() && g.receivers.len() != 1)
            .map(|g| NotSubmittable::Unbalanced {
                currency: g.currency.clone(),
                receivers: g.receivers.len(),
            })
    }
}

/// Checks submittability and normalizes the rows.
#[must_use]
pub fn check(transaction: &EditableTransaction, ctx: &FormatContext) -> BalanceCheck {
    let mut rows = transaction.rows.clone();
    normalize_rows(&mut rows, ctx);

    let analysis = Analysis::of(&rows);
    apply_hints(&mut rows, &analysis, ctx.decimal_separator);

    let reason = analysis.reason(&transaction.head);
    match &reason {
        None => debug!(rows = rows.len(), "transaction submittable"),
        Some(reason) => debug!(%reason, "transaction not submittable"),
    }

    let changed = rows != transaction.rows;
    BalanceCheck {
        transaction: EditableTransaction {
            head: transaction.head.clone(),
            rows,
        },
        reason,
        changed,
    }
}

/// Keeps exactly one placeholder per currency that has amounts, drops the
/// rest, pads to [`MIN_ROWS`] and moves the last-row flag.
fn normalize_rows(rows: &mut Vec<AccountRow>, ctx: &FormatContext) {
    let before = Analysis::of(rows);

    if !before.any_invalid {
        for group in &before.groups {
            if group.with_amount > 0 && group.blank_account == 0 {
                debug!(currency = %group.currency, "adding placeholder row");
                rows.push(AccountRow::placeholder(group.currency.clone()));
            }
        }
    }

    for group in &before.groups {
        drop_surplus_placeholders(rows, &group.currency);
    }

    while rows.len() < MIN_ROWS {
        rows.push(AccountRow::placeholder(ctx.default_currency.clone()));
    }

    let last = rows.len() - 1;
    for (position, row) in rows.iter_mut().enumerate() {
        row.is_last = position == last;
    }
}

/// Removes all but the first placeholder of `currency`, and that one too
/// when it is the only row of its currency.
fn drop_surplus_placeholders(rows: &mut Vec<AccountRow>, currency: &str) {
    while rows.len() > MIN_ROWS {
        let mut placeholders = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.currency == currency && r.is_placeholder())
            .map(|(position, _)| position);

        match (placeholders.next(), placeholders.next()) {
            (Some(_), Some(surplus)) => {
                rows.remove(surplus);
            }
            (Some(only), None) => {
                if rows.iter().filter(|r| r.currency == currency).count() == 1 {
                    debug!(%currency, "removing unused currency row");
                    rows.remove(only);
                }
                return;
            }
            _ => return,
        }
    }
}

fn apply_hints(rows: &mut [AccountRow], analysis: &Analysis, separator: char) {
    for group in &analysis.groups {
        let target = group.hint_target();
        let hint = target.map(|_| format_hint(-group.balance, separator));
        for (position, row) in rows.iter_mut().enumerate() {
            if row.currency != group.currency {
                continue;
            }
            row.amount_hint = if Some(position) == target {
                hint.clone()
            } else {
                None
            };
        }
    }
}
