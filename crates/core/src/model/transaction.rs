//! Transactions and postings.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::amount::StyledAmount;
use super::style::AmountStyle;

/// Clearing status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionStatus {
    /// No mark.
    #[default]
    Unmarked,
    /// Marked `!`.
    Pending,
    /// Marked `*`.
    Cleared,
}

impl TransactionStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unmarked => "Unmarked",
            Self::Pending => "Pending",
            Self::Cleared => "Cleared",
        }
    }

    /// Parses a wire name; unknown names are treated as unmarked.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value {
            "Pending" => Self::Pending,
            "Cleared" => Self::Cleared,
            _ => Self::Unmarked,
        }
    }
}

/// One account/amount line of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Full account name.
    pub account_name: String,
    /// Currency code, possibly empty.
    pub currency: String,
    /// Amount, unset when the server inferred it or the user left it blank.
    pub amount: Option<Decimal>,
    /// Posting comment, possibly empty.
    pub comment: String,
    /// Style reported by the server.
    pub amount_style: Option<AmountStyle>,
}

impl Posting {
    /// Creates a posting with a set amount.
    #[must_use]
    pub fn new(account_name: impl Into<String>, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            currency: currency.into(),
            amount: Some(amount),
            comment: String::new(),
            amount_style: None,
        }
    }

    /// Creates a posting whose amount is left for balancing.
    #[must_use]
    pub fn unset(account_name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            currency: currency.into(),
            amount: None,
            comment: String::new(),
            amount_style: None,
        }
    }

    /// The amount with its currency and style, if set.
    #[must_use]
    pub fn styled_amount(&self) -> Option<StyledAmount> {
        self.amount.map(|magnitude| StyledAmount {
            currency: self.currency.clone(),
            magnitude,
            style: self.amount_style.clone(),
        })
    }
}

/// A dated transaction with ordered postings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Server-side index; 1 for transactions built locally.
    pub index: u64,
    /// Primary date.
    pub date: NaiveDate,
    /// Secondary date.
    pub date2: Option<NaiveDate>,
    /// Clearing status.
    pub status: TransactionStatus,
    /// Transaction code, possibly empty.
    pub code: String,
    /// Payee/description.
    pub description: String,
    /// Comment, possibly empty.
    pub comment: String,
    /// Postings in declared order.
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Creates a transaction with no postings.
    #[must_use]
    pub fn new(index: u64, date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            index,
            date,
            date2: None,
            status: TransactionStatus::Unmarked,
            code: String::new(),
            description: description.into(),
            comment: String::new(),
            postings: Vec::new(),
        }
    }

    /// Appends a posting.
    pub fn add_posting(&mut self, posting: Posting) {
        self.postings.push(posting);
    }

    /// Sum of set amounts per currency, in first-seen order.
    #[must_use]
    pub fn balance_by_currency(&self) -> Vec<(String, Decimal)> {
        let mut totals: Vec<(String, Decimal)> = Vec::new();
        for posting in &self.postings {
            let Some(amount) = posting.amount else {
                continue;
            };
            match totals.iter_mut().find(|(c, _)| *c == posting.currency) {
                Some((_, total)) => *total += amount,
                None => totals.push((posting.currency.clone(), amount)),
            }
        }
        totals
    }

    /// True if every posting has an amount and each currency sums to zero.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.postings.iter().all(|p| p.amount.is_some())
            && self
                .balance_by_currency()
                .iter()
                .all(|(_, total)| total.is_zero())
    }
}
