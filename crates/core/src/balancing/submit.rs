//! Building the outbound transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::error;

use super::amount_text::ParsedAmount;
use super::error::BalancingError;
use super::rows::EditableTransaction;
use crate::model::{Posting, Transaction};

/// Index given to locally built transactions.
pub const LOCAL_TRANSACTION_INDEX: u64 = 1;

/// Converts an editable transaction into a canonical one.
///
/// Rows without an account are skipped. In each currency, rows with an
/// account and a blank amount receive the negated sum of the set amounts.
/// A missing date becomes `today`.
///
/// # Errors
///
/// Returns `BalancingError::InvalidAmountText` if a row's text does not
/// parse, and `BalancingError::InternalInvariantViolation` if a currency
/// with a non-zero sum has more than one blank amount to fill.
pub fn to_transaction(
    transaction: &EditableTransaction,
    today: NaiveDate,
) -> Result<Transaction, BalancingError> {
    let head = &transaction.head;
    let mut result = Transaction::new(
        LOCAL_TRANSACTION_INDEX,
        head.date.unwrap_or(today),
        head.description.trim(),
    );
    result.comment.clone_from(&head.comment);

    // (currency, sum of set amounts, postings waiting for an amount)
    let mut balances: Vec<(String, Decimal, Vec<usize>)> = Vec::new();

    for row in &transaction.rows {
        let account = row.account_name.trim();
        if account.is_empty() {
            continue;
        }

        let position = result.postings.len();
        let currency_index = match balances.iter().position(|(c, _, _)| *c == row.currency) {
            Some(index) => index,
            None => {
                balances.push((row.currency.clone(), Decimal::ZERO, Vec::new()));
                balances.len() - 1
            }
        };
        let entry = &mut balances[currency_index];

        let mut posting = match row.amount() {
            ParsedAmount::Valid(value) => {
                entry.1 += value;
                Posting::new(account, value, row.currency.clone())
            }
            ParsedAmount::Unset => {
                entry.2.push(position);
                Posting::unset(account, row.currency.clone())
            }
            ParsedAmount::Invalid => {
                return Err(BalancingError::InvalidAmountText {
                    text: row.amount_text().to_string(),
                });
            }
        };
        posting.comment.clone_from(&row.comment);
        result.add_posting(posting);
    }

    for (currency, balance, receivers) in balances {
        if !balance.is_zero() && receivers.len() > 1 {
            error!(
                %currency,
                %balance,
                receivers = receivers.len(),
                "submitted transaction has several postings without amount"
            );
            return Err(BalancingError::InternalInvariantViolation(format!(
                "{} postings without amount for non-zero balance in '{currency}'",
                receivers.len()
            )));
        }
        for position in receivers {
            result.postings[position].amount = Some(-balance);
        }
    }

    Ok(result)
}
