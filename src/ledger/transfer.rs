//! Executes transfers between two accounts as a pair of sequential balance
//! writes with a manual compensating rollback.

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    database_id::{AccountId, GroupId},
    ledger::balance::apply_delta,
    models::{Transaction, TransactionKind, UserId},
    stores::{AccountStore, TransactionStore},
};

/// The lifecycle of a transfer.
///
/// Every transfer walks `Pending → Debited → (Credited | CompensationPending)
/// → (Done | Inconsistent)`. The two balance writes are separate store calls,
/// so a failure between them is a real, observable position in this machine
/// rather than something that can only be reconstructed from logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// No balance has been written yet.
    Pending,
    /// The source debit is committed; the destination credit is not.
    Debited,
    /// Both balance writes are committed.
    Credited,
    /// The destination credit failed; the source balance must be restored.
    CompensationPending,
    /// Terminal: both balances are settled (either the transfer completed or
    /// the debit was successfully undone).
    Done,
    /// Terminal: the compensating write failed. The source balance is wrong
    /// and manual reconciliation may be needed.
    Inconsistent,
}

/// A non-blocking warning returned alongside a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Advisory {
    /// The operation drove an account's balance below zero. Allowed, but
    /// worth telling the user about.
    NegativeBalance {
        /// The account left overdrawn.
        account_id: AccountId,
        /// Its balance after the operation, in cents.
        balance_cents: i64,
    },
}

/// Whether the paired ledger entries for a transfer were persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HistoryOutcome {
    /// Both entries were written.
    Written {
        /// The group linking the expense and income rows.
        group_id: GroupId,
    },
    /// The balance writes committed but the ledger entries did not. The
    /// balances are correct; the audit trail is incomplete.
    Failed {
        /// Why the history write failed.
        cause: String,
    },
}

/// The result of a transfer whose balance writes both committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    /// The source account's balance after the debit, in cents.
    pub source_balance_cents: i64,
    /// The destination account's balance after the credit, in cents.
    pub destination_balance_cents: i64,
    /// Set when the debit left the source overdrawn.
    pub advisory: Option<Advisory>,
    /// Whether the paired ledger entries were written.
    pub history: HistoryOutcome,
}

/// Moves an amount from one account to another as a single user-visible
/// operation.
///
/// The debit always lands before the credit so that a mid-operation failure
/// reads as "money left the source but never arrived", never as money created
/// out of nothing.
pub struct TransferExecutor<'a, A, T> {
    accounts: &'a mut A,
    transactions: &'a mut T,
    state: TransferState,
}

impl<'a, A, T> TransferExecutor<'a, A, T>
where
    A: AccountStore,
    T: TransactionStore,
{
    /// Create an executor over the given stores.
    pub fn new(accounts: &'a mut A, transactions: &'a mut T) -> Self {
        Self {
            accounts,
            transactions,
            state: TransferState::Pending,
        }
    }

    /// The executor's current position in the transfer lifecycle.
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Move `amount_cents` from `source_id` to `destination_id`.
    ///
    /// Overdrawing the source is allowed and reported through the outcome's
    /// advisory, not an error. A failed history write degrades the result
    /// (see [HistoryOutcome::Failed]) but does not roll back the committed
    /// balances.
    ///
    /// # Errors
    /// - [Error::InvalidTransfer] if the accounts are the same, inactive, or
    ///   the amount is not positive. Nothing was mutated.
    /// - [Error::AccountNotFound] if either account does not resolve for
    ///   `user_id`. Nothing was mutated.
    /// - [Error::TransferFailed] if the debit write failed (nothing mutated),
    ///   or if the credit write failed and the source balance was restored.
    /// - [Error::CompensationFailed] if the credit write failed and so did
    ///   the write restoring the source balance. The ledger is inconsistent.
    pub fn execute(
        &mut self,
        user_id: UserId,
        source_id: AccountId,
        destination_id: AccountId,
        amount_cents: i64,
        date: Date,
        description: &str,
    ) -> Result<TransferOutcome, Error> {
        if source_id == destination_id {
            return Err(Error::InvalidTransfer(
                "the source and destination accounts must differ".to_string(),
            ));
        }

        if amount_cents <= 0 {
            return Err(Error::InvalidTransfer(format!(
                "{amount_cents} is not a positive amount of cents"
            )));
        }

        let source = self.accounts.get(user_id, source_id)?;
        let destination = self.accounts.get(user_id, destination_id)?;

        for account in [&source, &destination] {
            if !account.active {
                return Err(Error::InvalidTransfer(format!(
                    "account {} ({}) is inactive",
                    account.id, account.name
                )));
            }
        }

        let source_balance_before = source.balance_cents;
        let source_balance_after = source_balance_before - amount_cents;
        let advisory = if source_balance_after < 0 {
            Some(Advisory::NegativeBalance {
                account_id: source_id,
                balance_cents: source_balance_after,
            })
        } else {
            None
        };

        let source_balance = match apply_delta(self.accounts, user_id, source_id, -amount_cents) {
            Ok(balance) => balance,
            Err(error) => return Err(Error::TransferFailed(error.to_string())),
        };
        self.state = TransferState::Debited;
        tracing::debug!(
            source = source_id,
            destination = destination_id,
            amount = amount_cents,
            "debited transfer source"
        );

        let destination_balance =
            match apply_delta(self.accounts, user_id, destination_id, amount_cents) {
                Ok(balance) => balance,
                Err(error) => {
                    self.state = TransferState::CompensationPending;
                    return Err(self.compensate(user_id, source_id, source_balance_before, error));
                }
            };
        self.state = TransferState::Credited;

        let history = match self.write_history(
            user_id,
            source_id,
            destination_id,
            amount_cents,
            date,
            description,
        ) {
            Ok(group_id) => HistoryOutcome::Written { group_id },
            Err(error) => {
                tracing::warn!(
                    %error,
                    source = source_id,
                    destination = destination_id,
                    "transfer balances committed but the ledger entries were not written"
                );
                HistoryOutcome::Failed {
                    cause: error.to_string(),
                }
            }
        };
        self.state = TransferState::Done;

        Ok(TransferOutcome {
            source_balance_cents: source_balance,
            destination_balance_cents: destination_balance,
            advisory,
            history,
        })
    }

    /// Undo the committed debit by restoring the source's pre-debit balance.
    ///
    /// Restoring the captured value rather than re-adding the amount keeps
    /// the undo idempotent with respect to the debit.
    fn compensate(
        &mut self,
        user_id: UserId,
        source_id: AccountId,
        source_balance_before: i64,
        cause: Error,
    ) -> Error {
        match self
            .accounts
            .set_balance(user_id, source_id, source_balance_before)
        {
            Ok(_) => {
                self.state = TransferState::Done;
                tracing::info!(
                    account = source_id,
                    "restored the source balance after a failed credit"
                );
                Error::TransferFailed(cause.to_string())
            }
            Err(compensation_error) => {
                self.state = TransferState::Inconsistent;
                let error = Error::CompensationFailed {
                    account_id: source_id,
                    expected_balance_cents: source_balance_before,
                    cause: compensation_error.to_string(),
                };
                tracing::error!(
                    %error,
                    "transfer left the ledger inconsistent, manual reconciliation may be needed"
                );
                error
            }
        }
    }

    fn write_history(
        &mut self,
        user_id: UserId,
        source_id: AccountId,
        destination_id: AccountId,
        amount_cents: i64,
        date: Date,
        description: &str,
    ) -> Result<GroupId, Error> {
        let group_id = self.transactions.create_group(user_id)?;

        self.transactions.insert_batch(
            user_id,
            vec![
                Transaction::draft(amount_cents, TransactionKind::Expense, date, description)
                    .account(source_id)
                    .settled(true)
                    .group(group_id),
                Transaction::draft(amount_cents, TransactionKind::Income, date, description)
                    .account(destination_id)
                    .settled(true)
                    .group(group_id),
            ],
        )?;

        Ok(group_id)
    }
}
