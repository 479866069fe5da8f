/*! This module defines the traits for mapping domain models to and from the
application's database, and the function that creates the schema. */

use rusqlite::{Connection, Row, Transaction as SqlTransaction};

use crate::{
    Error,
    stores::sqlite::{
        SqliteAccountStore, SqliteCardStore, SqliteCategoryStore, SqliteTransactionStore,
    },
};

/// A trait for adding an object schema to the database.
pub trait CreateTable {
    /// Create the table(s) for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping a `rusqlite::Row` from the database to a concrete rust
/// type.
pub trait MapRow {
    /// The type the row is converted into.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the
    /// table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading from column `offset`.
    ///
    /// This is useful in cases where tables have been joined and you want to
    /// construct two different types from the one query.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Create the tables for all domain models in one exclusive transaction.
///
/// # Errors
/// Returns an error if the database cannot be written to or if there is an
/// SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // SQLite leaves foreign keys off unless the connection opts in; the
    // engine relies on them to reject inserts against missing rows.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    SqliteAccountStore::create_table(&transaction)?;
    SqliteCardStore::create_table(&transaction)?;
    SqliteCategoryStore::create_table(&transaction)?;
    SqliteTransactionStore::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
