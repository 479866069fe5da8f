//! The ledger consistency engine.
//!
//! This module owns the logic that keeps balances and the entry log
//! consistent: signed balance deltas, two-sided transfers with a compensating
//! rollback, recurring-transaction expansion, and credit-card installment
//! billing. [LedgerService] composes the pieces over the store traits in
//! [crate::stores] and is the surface the rest of the app calls.

mod balance;
mod billing;
mod calendar;
mod recurrence;
mod service;
mod transfer;

pub use balance::apply_delta;
pub use billing::{Installment, MAX_INSTALLMENTS, StatementCycle, plan_installments};
pub use recurrence::{Frequency, MAX_OCCURRENCES, expand};
pub use service::{LedgerConfig, LedgerService};
pub use transfer::{Advisory, HistoryOutcome, TransferExecutor, TransferOutcome, TransferState};
