//! Applies signed deltas to an account's stored balance.

use crate::{Error, database_id::AccountId, models::UserId, stores::AccountStore};

/// Apply a signed delta to the stored balance of `account_id` and return the
/// new balance.
///
/// A negative result is a valid state, not an error: accounts are allowed to
/// go overdrawn and the caller decides whether to warn about it.
///
/// The read and the write are two separate store calls with no lock between
/// them; concurrent callers racing on the same account follow last-write-wins
/// semantics with no detection.
///
/// # Errors
/// Returns [Error::AccountNotFound] if `account_id` does not resolve to an
/// account owned by `user_id`.
pub fn apply_delta<A: AccountStore>(
    accounts: &mut A,
    user_id: UserId,
    account_id: AccountId,
    delta_cents: i64,
) -> Result<i64, Error> {
    let account = accounts.get(user_id, account_id)?;

    accounts.set_balance(user_id, account_id, account.balance_cents + delta_cents)
}
