//! Contains SQLite backed implementations of the store traits and a
//! convenience constructor for a [LedgerService] on that backend.

mod account;
mod card;
mod category;
mod transaction;

pub use account::SqliteAccountStore;
pub use card::SqliteCardStore;
pub use category::SqliteCategoryStore;
pub use transaction::SqliteTransactionStore;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    ledger::{LedgerConfig, LedgerService},
};

/// An alias for a [LedgerService] that uses SQLite for the backend.
pub type SqliteLedgerService = LedgerService<
    SqliteAccountStore,
    SqliteCardStore,
    SqliteCategoryStore,
    SqliteTransactionStore,
>;

/// Creates a [LedgerService] that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the domain
/// models.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_ledger_service(
    db_connection: Connection,
    config: LedgerConfig,
) -> Result<SqliteLedgerService, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(LedgerService::new(
        config,
        SqliteAccountStore::new(connection.clone()),
        SqliteCardStore::new(connection.clone()),
        SqliteCategoryStore::new(connection.clone()),
        SqliteTransactionStore::new(connection),
    ))
}
