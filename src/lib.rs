//! Caderneta is the ledger consistency engine for a personal-finance app.
//!
//! The crate owns the money-movement logic: account-to-account transfers with
//! a compensating rollback, expansion of recurring transactions into dated
//! series, and credit-card installment billing with statement-window
//! arithmetic. Everything user-facing (forms, routes, rendering) lives
//! elsewhere and drives this crate through [ledger::LedgerService].
//!
//! Persistence is SQLite behind the store traits in [stores]; every row is
//! scoped to an owning user and all monetary values are signed integer cents.

#![warn(missing_docs)]

mod database_id;
mod db;
mod error;

pub mod ledger;
pub mod models;
pub mod stores;

pub use database_id::{AccountId, CardId, CategoryId, DatabaseId, GroupId, TransactionId};
pub use db::initialize as initialize_db;
pub use error::Error;
