//! Defines the account store trait.

use crate::{
    Error,
    database_id::AccountId,
    models::{Account, UserId},
};

/// Handles the creation and retrieval of accounts and their stored balances.
pub trait AccountStore {
    /// Create a new account with an opening balance.
    fn create(
        &mut self,
        user_id: UserId,
        name: &str,
        opening_balance_cents: i64,
    ) -> Result<Account, Error>;

    /// Retrieve the account `id` owned by `user_id`.
    ///
    /// # Errors
    /// Returns [Error::AccountNotFound] if `id` does not resolve to an
    /// account owned by `user_id`.
    fn get(&self, user_id: UserId, id: AccountId) -> Result<Account, Error>;

    /// Retrieve all accounts owned by `user_id`.
    fn get_all(&self, user_id: UserId) -> Result<Vec<Account>, Error>;

    /// Overwrite the stored balance of account `id` and return the new value.
    ///
    /// Negative balances are valid; the store does not reject them.
    ///
    /// # Errors
    /// Returns [Error::AccountNotFound] if `id` does not resolve to an
    /// account owned by `user_id`.
    fn set_balance(
        &mut self,
        user_id: UserId,
        id: AccountId,
        balance_cents: i64,
    ) -> Result<i64, Error>;

    /// Mark the account as inactive, keeping its rows and history.
    ///
    /// # Errors
    /// Returns [Error::AccountNotFound] if `id` does not resolve to an
    /// account owned by `user_id`.
    fn deactivate(&mut self, user_id: UserId, id: AccountId) -> Result<(), Error>;

    /// The sum of stored balances across the user's accounts.
    fn total_balance(&self, user_id: UserId) -> Result<i64, Error>;
}
