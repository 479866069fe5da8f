use serde::{Deserialize, Serialize};

use crate::{database_id::CardId, models::UserId};

/// A credit card and its statement cycle configuration.
///
/// A card holds no balance of its own: its usage is derived by summing the
/// transactions charged to it. The close/due days drive the statement-window
/// arithmetic in [crate::ledger::StatementCycle].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// The ID of the card.
    pub id: CardId,
    /// The user that owns the card.
    pub user_id: UserId,
    /// The display name of the card.
    pub name: String,
    /// The day of the month (1-31) the statement closes.
    ///
    /// Days past the end of a month clamp to that month's last day.
    pub close_day: u8,
    /// The day of the month (1-31) payment for a closed statement is due.
    pub due_day: u8,
    /// The credit limit in cents.
    pub limit_cents: i64,
    /// Whether the card accepts new purchases.
    pub active: bool,
}
