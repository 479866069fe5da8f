use serde::{Deserialize, Serialize};

use crate::{database_id::AccountId, models::UserId};

/// A bank account that money can be spent from, earned into, or transferred
/// between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserId,
    /// The display name of the account.
    pub name: String,
    /// The current balance in signed integer cents. May be negative.
    ///
    /// The balance is the sum of the account's settled ledger entries, stored
    /// denormalized for fast reads. Every balance mutation goes through the
    /// engine so the stored value stays consistent with the entry log.
    pub balance_cents: i64,
    /// Whether the account can take part in new operations.
    ///
    /// Deactivated accounts keep their history but reject new transfers.
    pub active: bool,
}
