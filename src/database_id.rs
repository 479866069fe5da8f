//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of an [Account](crate::models::Account) row.
pub type AccountId = i64;
/// The ID of a [Card](crate::models::Card) row.
pub type CardId = i64;
/// The ID of a [Category](crate::models::Category) row.
pub type CategoryId = i64;
/// The ID of a [Transaction](crate::models::Transaction) row.
pub type TransactionId = i64;
/// The ID of a transaction group row linking the rows of one logical intent.
pub type GroupId = i64;
