//! Defines the category store trait.

use crate::{
    Error,
    database_id::CategoryId,
    models::{Category, UserId},
};

/// Handles the creation and retrieval of categories.
pub trait CategoryStore {
    /// Create a new category.
    fn create(&mut self, user_id: UserId, name: &str) -> Result<Category, Error>;

    /// Retrieve the category `id` owned by `user_id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not resolve to a category owned
    /// by `user_id`.
    fn get(&self, user_id: UserId, id: CategoryId) -> Result<Category, Error>;

    /// Retrieve all categories owned by `user_id`.
    fn get_all(&self, user_id: UserId) -> Result<Vec<Category>, Error>;
}
