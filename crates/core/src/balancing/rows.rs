//! Editable transaction rows.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use ledgersync_shared::types::RowId;

use super::amount_text::{ParsedAmount, format_hint, parse_amount};
use super::engine::MIN_ROWS;
use crate::model::{FormatContext, Transaction};

/// Header fields of a transaction being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionHead {
    /// Date; `None` means "today" at submission time.
    pub date: Option<NaiveDate>,
    /// Description, required for submission.
    pub description: String,
    /// Free-form comment.
    pub comment: String,
}

/// One account row of a transaction being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRow {
    id: RowId,
    /// Account name as typed.
    pub account_name: String,
    amount_text: String,
    amount: ParsedAmount,
    /// Currency code, possibly empty.
    pub currency: String,
    /// Free-form comment.
    pub comment: String,
    /// Suggested balancing amount shown while the field is blank.
    pub amount_hint: Option<String>,
    /// Set on the physically last row only.
    pub is_last: bool,
}

impl AccountRow {
    /// Creates a row for an account with no amount.
    #[must_use]
    pub fn new(account_name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            id: RowId::new(),
            account_name: account_name.into(),
            amount_text: String::new(),
            amount: ParsedAmount::Unset,
            currency: currency.into(),
            comment: String::new(),
            amount_hint: None,
            is_last: false,
        }
    }

    /// Creates a blank row inviting input in `currency`.
    #[must_use]
    pub fn placeholder(currency: impl Into<String>) -> Self {
        Self::new(String::new(), currency)
    }

    /// Stable identifier of the row.
    #[must_use]
    pub const fn id(&self) -> RowId {
        self.id
    }

    /// Amount text as typed.
    #[must_use]
    pub fn amount_text(&self) -> &str {
        &self.amount_text
    }

    /// Parsed state of the amount text.
    #[must_use]
    pub const fn amount(&self) -> ParsedAmount {
        self.amount
    }

    /// True if the account name is blank.
    #[must_use]
    pub fn has_blank_account(&self) -> bool {
        self.account_name.trim().is_empty()
    }

    /// Replaces the amount text.
    ///
    /// Returns true if the parsed value changed; re-typing "10" as "10.0"
    /// is not significant.
    pub fn set_amount_text(&mut self, text: impl Into<String>, separator: char) -> bool {
        self.amount_text = text.into();
        let parsed = parse_amount(&self.amount_text, separator);
        let significant = parsed != self.amount;
        self.amount = parsed;
        significant
    }

    /// Sets a numeric amount, rendering the text with `separator`.
    pub fn set_amount(&mut self, value: Decimal, separator: char) {
        self.amount_text = format_hint(value, separator);
        self.amount = ParsedAmount::Valid(value);
    }

    /// Clears the amount.
    pub fn reset_amount(&mut self) {
        self.amount_text.clear();
        self.amount = ParsedAmount::Unset;
    }

    /// True if the row has neither account, amount nor comment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.has_blank_account() && !self.amount.is_set() && self.comment.trim().is_empty()
    }

    /// True for a blank-account row without an amount.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.has_blank_account() && !self.amount.is_set()
    }
}

/// A transaction under construction: one head and its account rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableTransaction {
    /// Header fields.
    pub head: TransactionHead,
    /// Account rows in display order.
    pub rows: Vec<AccountRow>,
}

impl EditableTransaction {
    /// Creates the initial form: an empty head and two placeholders in the
    /// default currency.
    #[must_use]
    pub fn new(ctx: &FormatContext) -> Self {
        let mut rows = vec![
            AccountRow::placeholder(ctx.default_currency.clone()),
            AccountRow::placeholder(ctx.default_currency.clone()),
        ];
        if let Some(last) = rows.last_mut() {
            last.is_last = true;
        }
        Self {
            head: TransactionHead::default(),
            rows,
        }
    }

    /// Loads an existing transaction for duplication.
    ///
    /// The date is dropped so the copy defaults to the submission day. The
    /// rows are padded with default-currency placeholders up to [`MIN_ROWS`]
    /// and the last one is flagged.
    #[must_use]
    pub fn from_transaction(transaction: &Transaction, ctx: &FormatContext) -> Self {
        let mut rows: Vec<AccountRow> = transaction
            .postings
            .iter()
            .map(|posting| {
                let mut row = AccountRow::new(posting.account_name.clone(), posting.currency.clone());
                row.comment.clone_from(&posting.comment);
                if let Some(amount) = posting.amount {
                    row.set_amount(amount, ctx.decimal_separator);
                }
                row
            })
            .collect();
        while rows.len() < MIN_ROWS {
            rows.push(AccountRow::placeholder(ctx.default_currency.clone()));
        }
        if let Some(last) = rows.last_mut() {
            last.is_last = true;
        }
        Self {
            head: TransactionHead {
                date: None,
                description: transaction.description.clone(),
                comment: transaction.comment.clone(),
            },
            rows,
        }
    }

    /// Finds a row by identifier.
    #[must_use]
    pub fn row(&self, id: RowId) -> Option<&AccountRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Position of a row.
    #[must_use]
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// True if no row holds any input.
    #[must_use]
    pub fn accounts_in_initial_state(&self) -> bool {
        self.rows.iter().all(AccountRow::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Posting;
    use rust_decimal_macros::dec;

    #[test]
    fn test_set_amount_text_significance() {
        let mut row = AccountRow::new("Expenses:Food", "USD");
        assert!(row.set_amount_text("10", '.'));
        assert_eq!(row.amount(), ParsedAmount::Valid(dec!(10)));
        assert!(!row.set_amount_text("10.0", '.'));
        assert_eq!(row.amount_text(), "10.0");
        assert!(row.set_amount_text("10.0x", '.'));
        assert!(row.amount().is_invalid());
        assert!(row.set_amount_text("", '.'));
        assert!(!row.amount().is_set());
    }

    #[test]
    fn test_set_and_reset_amount() {
        let mut row = AccountRow::new("Assets:Cash", "EUR");
        row.set_amount(dec!(-3.5), ',');
        assert_eq!(row.amount_text(), "-3,50");
        assert_eq!(row.amount().value(), Some(dec!(-3.5)));
        row.reset_amount();
        assert_eq!(row.amount_text(), "");
        assert_eq!(row.amount(), ParsedAmount::Unset);
    }

    #[test]
    fn test_placeholder_and_empty() {
        let mut row = AccountRow::placeholder("USD");
        assert!(row.is_placeholder());
        assert!(row.is_empty());
        row.comment = "note".into();
        assert!(row.is_placeholder());
        assert!(!row.is_empty());
        row.account_name = "  ".into();
        assert!(row.has_blank_account());
    }

    #[test]
    fn test_new_form() {
        let ctx = FormatContext {
            default_currency: "USD".into(),
            ..FormatContext::default()
        };
        let tx = EditableTransaction::new(&ctx);
        assert_eq!(tx.rows.len(), 2);
        assert!(tx.rows.iter().all(|r| r.currency == "USD"));
        assert!(!tx.rows[0].is_last);
        assert!(tx.rows[1].is_last);
        assert!(tx.accounts_in_initial_state());
        assert_ne!(tx.rows[0].id(), tx.rows[1].id());
    }

    #[test]
    fn test_from_transaction() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut source = Transaction::new(7, date, "Groceries");
        source.comment = "weekly".into();
        let mut food = Posting::new("Expenses:Food", dec!(12.5), "USD");
        food.comment = "veg".into();
        source.add_posting(food);
        source.add_posting(Posting::unset("Assets:Cash", "USD"));

        let tx = EditableTransaction::from_transaction(&source, &FormatContext::default());
        assert_eq!(tx.head.date, None);
        assert_eq!(tx.head.description, "Groceries");
        assert_eq!(tx.head.comment, "weekly");
        assert_eq!(tx.rows.len(), 2);
        assert_eq!(tx.rows[0].amount_text(), "12.50");
        assert_eq!(tx.rows[0].comment, "veg");
        assert_eq!(tx.rows[1].amount(), ParsedAmount::Unset);
        assert_eq!(tx.position(tx.rows[1].id()), Some(1));
        assert!(!tx.rows[0].is_last);
        assert!(tx.rows[1].is_last);
    }

    #[test]
    fn test_from_transaction_pads_short_posting_list() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut source = Transaction::new(8, date, "Opening");
        source.add_posting(Posting::new("Equity:Opening", dec!(100), "EUR"));
        let ctx = FormatContext {
            default_currency: "USD".into(),
            ..FormatContext::default()
        };

        let tx = EditableTransaction::from_transaction(&source, &ctx);
        assert_eq!(tx.rows.len(), MIN_ROWS);
        assert!(tx.rows[1].is_placeholder());
        assert_eq!(tx.rows[1].currency, "USD");
        assert_eq!(tx.rows.iter().filter(|r| r.is_last).count(), 1);
        assert!(tx.rows[1].is_last);

        let empty = Transaction::new(9, date, "Nothing");
        let tx = EditableTransaction::from_transaction(&empty, &ctx);
        assert_eq!(tx.rows.len(), MIN_ROWS);
        assert!(tx.rows.iter().all(AccountRow::is_placeholder));
        assert!(tx.rows[MIN_ROWS - 1].is_last);
    }
}
