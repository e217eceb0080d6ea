//! Edit sessions.
//!
//! An [`EditSession`] owns the published row list of one transaction being
//! edited. Every edit works on a private copy, runs the balancing check and
//! publishes the normalized result to observers. Edits issued while a
//! previous edit is still publishing are rejected, so an observer that
//! reacts to a snapshot by editing again gets
//! [`BalancingError::ReentrantUpdate`] instead of recursing.
//!
//! Callers serialize edits; a concurrent edit from another thread is
//! rejected the same way rather than queued.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::{debug, info};

use ledgersync_shared::types::{RowId, SessionId};

use super::engine::{BalanceCheck, check};
use super::error::{BalancingError, NotSubmittable};
use super::rows::{AccountRow, EditableTransaction};
use super::submit::to_transaction;
use crate::model::{FormatContext, Transaction};

/// Published state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Normalized transaction with hints.
    pub transaction: EditableTransaction,
    /// First failed submittability rule.
    pub reason: Option<NotSubmittable>,
}

impl Snapshot {
    /// True if the transaction can be submitted.
    #[must_use]
    pub const fn is_submittable(&self) -> bool {
        self.reason.is_none()
    }
}

impl From<BalanceCheck> for Snapshot {
    fn from(result: BalanceCheck) -> Self {
        Self {
            transaction: result.transaction,
            reason: result.reason,
        }
    }
}

/// Callback receiving every published snapshot.
pub type Observer = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Clears the updating flag when an edit ends, including by panic.
struct UpdateGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> UpdateGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, BalancingError> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| BalancingError::ReentrantUpdate)?;
        Ok(Self { flag })
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A transaction being edited.
pub struct EditSession {
    id: SessionId,
    ctx: FormatContext,
    state: Mutex<Snapshot>,
    updating: AtomicBool,
    observers: Mutex<Vec<Observer>>,
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("id", &self.id)
            .field("ctx", &self.ctx)
            .field("updating", &self.updating.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EditSession {
    /// Starts a session on an empty form.
    #[must_use]
    pub fn new(ctx: FormatContext) -> Self {
        let initial = EditableTransaction::new(&ctx);
        Self::with_transaction(initial, ctx)
    }

    /// Starts a session on a copy of an existing transaction.
    #[must_use]
    pub fn duplicate(transaction: &Transaction, ctx: FormatContext) -> Self {
        let initial = EditableTransaction::from_transaction(transaction, &ctx);
        Self::with_transaction(initial, ctx)
    }

    fn with_transaction(transaction: EditableTransaction, ctx: FormatContext) -> Self {
        let snapshot = Snapshot::from(check(&transaction, &ctx));
        let id = SessionId::new();
        debug!(session = %id, rows = snapshot.transaction.rows.len(), "edit session started");
        Self {
            id,
            ctx,
            state: Mutex::new(snapshot),
            updating: AtomicBool::new(false),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Formatting context of the session.
    #[must_use]
    pub const fn context(&self) -> &FormatContext {
        &self.ctx
    }

    /// Registers an observer for future snapshots.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::StatePoisoned` if an observer panicked
    /// while being registered.
    pub fn subscribe(&self, observer: Observer) -> Result<(), BalancingError> {
        self.observers
            .lock()
            .map_err(|_| BalancingError::StatePoisoned)?
            .push(observer);
        Ok(())
    }

    /// Current published state.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::StatePoisoned` if an edit panicked.
    pub fn snapshot(&self) -> Result<Snapshot, BalancingError> {
        Ok(self.lock_state()?.clone())
    }

    /// Whether the current state can be submitted.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::StatePoisoned` if an edit panicked.
    pub fn is_submittable(&self) -> Result<bool, BalancingError> {
        Ok(self.lock_state()?.is_submittable())
    }

    /// Sets the description.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::ReentrantUpdate` while another edit is
    /// publishing.
    pub fn set_description(&self, description: impl Into<String>) -> Result<(), BalancingError> {
        let description = description.into();
        self.update(|tx| {
            tx.head.description = description;
            Ok(())
        })
    }

    /// Sets or clears the date.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::ReentrantUpdate` while another edit is
    /// publishing.
    pub fn set_date(&self, date: Option<NaiveDate>) -> Result<(), BalancingError> {
        self.update(|tx| {
            tx.head.date = date;
            Ok(())
        })
    }

    /// Sets the transaction comment.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::ReentrantUpdate` while another edit is
    /// publishing.
    pub fn set_transaction_comment(&self, comment: impl Into<String>) -> Result<(), BalancingError> {
        let comment = comment.into();
        self.update(|tx| {
            tx.head.comment = comment;
            Ok(())
        })
    }

    /// Sets a row's account name.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::RowNotFound` for an unknown row.
    pub fn set_account_name(&self, row: RowId, name: impl Into<String>) -> Result<(), BalancingError> {
        let name = name.into();
        self.update(|tx| {
            row_mut(tx, row)?.account_name = name;
            Ok(())
        })
    }

    /// Sets a row's amount text.
    ///
    /// Returns true if the parsed amount changed.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::RowNotFound` for an unknown row.
    pub fn set_amount_text(&self, row: RowId, text: impl Into<String>) -> Result<bool, BalancingError> {
        let text = text.into();
        let separator = self.ctx.decimal_separator;
        self.update(|tx| Ok(row_mut(tx, row)?.set_amount_text(text, separator)))
    }

    /// Sets a row's currency.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::RowNotFound` for an unknown row.
    pub fn set_currency(&self, row: RowId, currency: impl Into<String>) -> Result<(), BalancingError> {
        let currency = currency.into();
        self.update(|tx| {
            row_mut(tx, row)?.currency = currency;
            Ok(())
        })
    }

    /// Sets a row's comment.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::RowNotFound` for an unknown row.
    pub fn set_row_comment(&self, row: RowId, comment: impl Into<String>) -> Result<(), BalancingError> {
        let comment = comment.into();
        self.update(|tx| {
            row_mut(tx, row)?.comment = comment;
            Ok(())
        })
    }

    /// Inserts a row for `account_name` after `after`, or at the end.
    ///
    /// The new row takes the currency of the row it follows, or the
    /// default currency. A row inserted without an account may be removed
    /// again by normalization.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::RowNotFound` if `after` is unknown.
    pub fn add_row(
        &self,
        after: Option<RowId>,
        account_name: impl Into<String>,
    ) -> Result<RowId, BalancingError> {
        let account_name = account_name.into();
        let default_currency = self.ctx.default_currency.clone();
        self.update(|tx| {
            let (position, currency) = match after {
                Some(id) => {
                    let position = tx.position(id).ok_or(BalancingError::RowNotFound(id))?;
                    (position + 1, tx.rows[position].currency.clone())
                }
                None => (tx.rows.len(), default_currency),
            };
            let row = AccountRow::new(account_name, currency);
            let id = row.id();
            tx.rows.insert(position, row);
            Ok(id)
        })
    }

    /// Removes a row.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::RowNotFound` for an unknown row.
    pub fn remove_row(&self, row: RowId) -> Result<(), BalancingError> {
        self.update(|tx| {
            let position = tx.position(row).ok_or(BalancingError::RowNotFound(row))?;
            tx.rows.remove(position);
            Ok(())
        })
    }

    /// Moves a row to position `to`.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::RowNotFound` for an unknown row and
    /// `BalancingError::RowOutOfRange` if `to` is past the last row.
    pub fn move_row(&self, row: RowId, to: usize) -> Result<(), BalancingError> {
        self.update(|tx| {
            let from = tx.position(row).ok_or(BalancingError::RowNotFound(row))?;
            if to >= tx.rows.len() {
                return Err(BalancingError::RowOutOfRange {
                    position: to,
                    len: tx.rows.len(),
                });
            }
            let moved = tx.rows.remove(from);
            tx.rows.insert(to, moved);
            Ok(())
        })
    }

    /// Builds the transaction to submit.
    ///
    /// # Errors
    ///
    /// Returns `BalancingError::NotSubmittable` with the failing rule, or
    /// `BalancingError::InternalInvariantViolation` if receiver resolution
    /// finds an ambiguous currency.
    pub fn finish(&self, today: NaiveDate) -> Result<Transaction, BalancingError> {
        let state = self.lock_state()?;
        if let Some(reason) = &state.reason {
            debug!(session = %self.id, %reason, "finish rejected");
            return Err(BalancingError::NotSubmittable(reason.clone()));
        }
        let transaction = to_transaction(&state.transaction, today)?;
        info!(
            session = %self.id,
            postings = transaction.postings.len(),
            "transaction ready for submission"
        );
        Ok(transaction)
    }

    /// Runs `edit` on a copy, checks it, stores and publishes the result.
    fn update<R>(
        &self,
        edit: impl FnOnce(&mut EditableTransaction) -> Result<R, BalancingError>,
    ) -> Result<R, BalancingError> {
        let _guard = UpdateGuard::acquire(&self.updating)?;

        let (value, snapshot, changed) = {
            let mut state = self.lock_state()?;
            let mut draft = state.transaction.clone();
            let value = edit(&mut draft)?;
            let result = check(&draft, &self.ctx);
            let changed = result.changed;
            *state = Snapshot::from(result);
            (value, state.clone(), changed)
        };
        debug!(
            session = %self.id,
            normalized = changed,
            submittable = snapshot.is_submittable(),
            "edit applied"
        );

        let observers = self
            .observers
            .lock()
            .map_err(|_| BalancingError::StatePoisoned)?
            .clone();
        for observer in observers {
            observer(&snapshot);
        }
        Ok(value)
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, Snapshot>, BalancingError> {
        self.state.lock().map_err(|_| BalancingError::StatePoisoned)
    }
}

fn row_mut(tx: &mut EditableTransaction, id: RowId) -> Result<&mut AccountRow, BalancingError> {
    tx.rows
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or(BalancingError::RowNotFound(id))
}
