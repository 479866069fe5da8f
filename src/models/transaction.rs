//! Defines the ledger entry model and the draft type used to create entries.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{AccountId, CardId, CategoryId, GroupId, TransactionId},
    models::UserId,
};

/// Whether a ledger entry adds money to or removes money from where it is
/// booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in (wages, a transfer arriving).
    Income,
    /// Money going out (a purchase, a transfer leaving).
    Expense,
}

impl TransactionKind {
    /// The value stored in the database `kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(FromSqlError::Other(
                format!("{other:?} is not a valid transaction kind").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The amount is a positive magnitude; the direction is carried by `kind`.
/// Once persisted an entry is never edited in place except to flip the
/// settlement flag.
///
/// To create a new `Transaction`, use [Transaction::draft].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserId,
    /// The account the entry is booked against. `None` for card-only entries.
    pub account_id: Option<AccountId>,
    /// The card the entry is charged to, if any.
    pub card_id: Option<CardId>,
    /// The amount of money spent or earned, as a positive number of cents.
    pub amount_cents: i64,
    /// Whether the entry is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened (or is scheduled to happen).
    pub date: Date,
    /// Whether the transaction has actually occurred (`true`) or is merely
    /// scheduled (`false`).
    pub settled: bool,
    /// The group linking the rows created by one logical intent, e.g. the
    /// instances of a recurrence series or both sides of a transfer.
    pub group_id: Option<GroupId>,
    /// This entry's 1-indexed position within its installment series.
    pub installment_number: Option<u32>,
    /// The total number of installments in the series.
    pub installment_total: Option<u32>,
    /// The due date of the card statement this entry is billed to.
    pub statement_due_date: Option<Date>,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
}

impl Transaction {
    /// Start a draft for a new transaction.
    ///
    /// Shortcut for [TransactionDraft] for discoverability.
    pub fn draft(
        amount_cents: i64,
        kind: TransactionKind,
        date: Date,
        description: &str,
    ) -> TransactionDraft {
        TransactionDraft {
            amount_cents,
            kind,
            date,
            description: description.to_owned(),
            settled: false,
            account_id: None,
            card_id: None,
            group_id: None,
            installment: None,
            statement_due_date: None,
            category_id: None,
        }
    }

    /// The entry's effect on a balance: positive for income, negative for an
    /// expense.
    pub fn signed_amount_cents(&self) -> i64 {
        match self.kind {
            TransactionKind::Income => self.amount_cents,
            TransactionKind::Expense => -self.amount_cents,
        }
    }
}

/// A transaction that has not been persisted yet.
///
/// Optional fields default to `None` and the draft starts out planned
/// (unsettled); chain the builder methods to fill in the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// The amount of money, as a positive number of cents.
    pub amount_cents: i64,
    /// Whether the entry is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happens.
    pub date: Date,
    /// A text description of what the transaction is for.
    pub description: String,
    /// Whether the transaction has already occurred.
    pub settled: bool,
    /// The account the entry is booked against, if any.
    pub account_id: Option<AccountId>,
    /// The card the entry is charged to, if any.
    pub card_id: Option<CardId>,
    /// The group linking this entry to the other rows of its intent.
    pub group_id: Option<GroupId>,
    /// The `(number, total)` position within an installment series.
    pub installment: Option<(u32, u32)>,
    /// The due date of the card statement this entry is billed to.
    pub statement_due_date: Option<Date>,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
}

impl TransactionDraft {
    /// Book the entry against an account.
    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Charge the entry to a card.
    pub fn card(mut self, card_id: CardId) -> Self {
        self.card_id = Some(card_id);
        self
    }

    /// Set the settlement flag.
    pub fn settled(mut self, settled: bool) -> Self {
        self.settled = settled;
        self
    }

    /// Link the entry to a transaction group.
    pub fn group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Tag the entry with its position within an installment series.
    pub fn installment(mut self, number: u32, total: u32) -> Self {
        self.installment = Some((number, total));
        self
    }

    /// Bill the entry to the card statement due on `date`.
    pub fn statement_due_date(mut self, date: Date) -> Self {
        self.statement_due_date = Some(date);
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Check the draft is well-formed.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is not a positive number
    /// of cents.
    pub fn validate(&self) -> Result<(), Error> {
        if self.amount_cents <= 0 {
            return Err(Error::InvalidAmount(self.amount_cents));
        }

        Ok(())
    }
}
