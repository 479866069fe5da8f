//! Defines the transaction store trait and its query type.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    Error,
    database_id::{AccountId, CardId, GroupId, TransactionId},
    models::{Transaction, TransactionDraft, UserId},
};

/// Handles the creation and retrieval of transactions and transaction groups.
pub trait TransactionStore {
    /// Create a new transaction group row and return its ID.
    ///
    /// One group is created per logical user intent (a single entry, a
    /// recurrence series, an installment series, or a transfer pair); every
    /// row the intent produces carries the same group ID.
    fn create_group(&mut self, user_id: UserId) -> Result<GroupId, Error>;

    /// Insert one transaction.
    ///
    /// # Errors
    /// Returns an [Error::InvalidAmount] if the draft's amount is not
    /// positive, an [Error::InvalidForeignKey] if the draft references a row
    /// that does not exist, or an [Error::SqlError] for other SQL errors.
    fn insert(&mut self, user_id: UserId, draft: TransactionDraft) -> Result<Transaction, Error>;

    /// Insert a batch of transactions atomically.
    ///
    /// Either every row in the batch is inserted or none are.
    ///
    /// # Errors
    /// Same as [TransactionStore::insert]; on any error the whole batch is
    /// rolled back.
    fn insert_batch(
        &mut self,
        user_id: UserId,
        drafts: Vec<TransactionDraft>,
    ) -> Result<Vec<Transaction>, Error>;

    /// Retrieve a transaction from the store.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not resolve to a transaction
    /// owned by `user_id`.
    fn get(&self, user_id: UserId, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve transactions from the store in the way defined by `query`.
    fn get_query(&self, user_id: UserId, query: TransactionQuery)
    -> Result<Vec<Transaction>, Error>;

    /// Flip the settlement flag of a transaction and return the updated row.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not resolve to a transaction
    /// owned by `user_id`.
    fn set_settled(
        &mut self,
        user_id: UserId,
        id: TransactionId,
        settled: bool,
    ) -> Result<Transaction, Error>;

    /// Hard-delete a transaction.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not resolve to a transaction
    /// owned by `user_id`.
    fn delete(&mut self, user_id: UserId, id: TransactionId) -> Result<(), Error>;

    /// The net amount charged to a card: the sum of its expenses minus the
    /// sum of its incomes (payments), in cents.
    ///
    /// Cards hold no stored balance; this derived aggregate is the only
    /// notion of card usage.
    fn card_usage(&self, user_id: UserId, card_id: CardId) -> Result<i64, Error>;
}

/// Defines how transactions should be fetched from
/// [TransactionStore::get_query].
#[derive(Default)]
pub struct TransactionQuery {
    /// Include only transactions booked against this account.
    pub account_id: Option<AccountId>,
    /// Include only transactions charged to this card.
    pub card_id: Option<CardId>,
    /// Include only transactions belonging to this group.
    pub group_id: Option<GroupId>,
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Orders transactions by date in the order `sort_date`. None returns
    /// transactions in the order they are stored.
    pub sort_date: Option<SortOrder>,
}

/// The order to sort transactions in a [TransactionQuery].
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}
