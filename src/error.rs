//! Defines the app level error type and the conversion from SQL errors.

use crate::database_id::{AccountId, CardId};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transfer request failed validation.
    ///
    /// No mutation was attempted; the caller can retry with corrected inputs.
    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    /// The account ID does not resolve to an account owned by the calling
    /// user.
    #[error("account {0} could not be found")]
    AccountNotFound(AccountId),

    /// The card ID does not resolve to a card owned by the calling user.
    #[error("card {0} could not be found")]
    CardNotFound(CardId),

    /// The card exists but has been deactivated, so it cannot take new
    /// purchases.
    #[error("card {0} is inactive")]
    CardInactive(CardId),

    /// The debit write of a transfer failed.
    ///
    /// Nothing was committed; both balances hold their original values.
    #[error("transfer aborted, no balance was changed: {0}")]
    TransferFailed(String),

    /// The credit write of a transfer failed and so did the write that should
    /// have restored the source balance.
    ///
    /// The source account now holds less than it should. This condition must
    /// be logged at error severity and surfaced to the caller, never folded
    /// into a generic failure, because manual reconciliation may be needed.
    #[error(
        "transfer compensation failed, account {account_id} should hold {expected_balance_cents} \
        cents: {cause}"
    )]
    CompensationFailed {
        /// The account whose balance could not be restored.
        account_id: AccountId,
        /// The pre-debit balance the account should have been restored to.
        expected_balance_cents: i64,
        /// The store error that prevented the compensating write.
        cause: String,
    },

    /// Splitting the purchase would produce installments below the configured
    /// per-installment floor.
    #[error(
        "{total_cents} cents split {count} ways falls below the minimum of {minimum_cents} cents \
        per installment"
    )]
    InstallmentMinimumNotMet {
        /// The total purchase amount in cents.
        total_cents: i64,
        /// The requested number of installments.
        count: u32,
        /// The configured per-installment floor in cents.
        minimum_cents: i64,
    },

    /// An occurrence or installment count outside the supported range, or an
    /// invalid statement day configuration.
    #[error("{0}")]
    InvalidSchedule(String),

    /// A zero or negative magnitude was used where a positive amount is
    /// required.
    ///
    /// Amounts are stored as positive magnitudes; the direction of the money
    /// movement is carried by the transaction kind, not the sign.
    #[error("{0} is not a valid amount, amounts must be a positive number of cents")]
    InvalidAmount(i64),

    /// A row referenced by a foreign key (e.g. a category ID) does not exist
    /// or belongs to another user.
    #[error("a row referenced by the request does not exist")]
    InvalidForeignKey,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidForeignKey
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
