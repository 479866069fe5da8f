//! Defines the card store trait.

use crate::{
    Error,
    database_id::CardId,
    models::{Card, UserId},
};

/// Handles the creation and retrieval of credit cards.
pub trait CardStore {
    /// Create a new card.
    ///
    /// # Errors
    /// Returns [Error::InvalidSchedule] if `close_day` or `due_day` is not in
    /// the range 1-31.
    fn create(
        &mut self,
        user_id: UserId,
        name: &str,
        close_day: u8,
        due_day: u8,
        limit_cents: i64,
    ) -> Result<Card, Error>;

    /// Retrieve the card `id` owned by `user_id`.
    ///
    /// # Errors
    /// Returns [Error::CardNotFound] if `id` does not resolve to a card owned
    /// by `user_id`.
    fn get(&self, user_id: UserId, id: CardId) -> Result<Card, Error>;

    /// Retrieve all cards owned by `user_id`.
    fn get_all(&self, user_id: UserId) -> Result<Vec<Card>, Error>;

    /// Mark the card as inactive so it rejects new purchases.
    ///
    /// # Errors
    /// Returns [Error::CardNotFound] if `id` does not resolve to a card owned
    /// by `user_id`.
    fn deactivate(&mut self, user_id: UserId, id: CardId) -> Result<(), Error>;
}
