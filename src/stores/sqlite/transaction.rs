//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    database_id::{CardId, GroupId, TransactionId},
    db::{CreateTable, MapRow},
    models::{Transaction, TransactionDraft, UserId},
    stores::{
        TransactionStore,
        transaction::{SortOrder, TransactionQuery},
    },
};

const TRANSACTION_COLUMNS: &str = "id, user_id, account_id, card_id, amount_cents, kind, date, \
    settled, group_id, installment_number, installment_total, statement_due_date, description, \
    category_id";

/// Stores transactions and transaction groups in a SQLite database.
///
/// Note that because a transaction may reference the
/// [Account](crate::models::Account), [Card](crate::models::Card) and
/// [Category](crate::models::Category) models, these models must be set up in
/// the database.
#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn insert_draft(
        connection: &Connection,
        user_id: UserId,
        draft: &TransactionDraft,
    ) -> Result<Transaction, Error> {
        let (installment_number, installment_total) = match draft.installment {
            Some((number, total)) => (Some(number), Some(total)),
            None => (None, None),
        };

        let transaction = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\" (user_id, account_id, card_id, amount_cents, kind, \
                 date, settled, group_id, installment_number, installment_total, \
                 statement_due_date, description, category_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    user_id.as_i64(),
                    draft.account_id,
                    draft.card_id,
                    draft.amount_cents,
                    draft.kind,
                    draft.date,
                    draft.settled,
                    draft.group_id,
                    installment_number,
                    installment_total,
                    draft.statement_due_date,
                    draft.description.as_str(),
                    draft.category_id,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }
}

impl TransactionStore for SqliteTransactionStore {
    fn create_group(&mut self, user_id: UserId) -> Result<GroupId, Error> {
        let group_id = self
            .connection
            .lock()
            .unwrap()
            .prepare("INSERT INTO transaction_group (user_id) VALUES (?1) RETURNING id")?
            .query_row((user_id.as_i64(),), |row| row.get(0))?;

        Ok(group_id)
    }

    fn insert(&mut self, user_id: UserId, draft: TransactionDraft) -> Result<Transaction, Error> {
        draft.validate()?;

        let connection = self.connection.lock().unwrap();

        Self::insert_draft(&connection, user_id, &draft)
    }

    fn insert_batch(
        &mut self,
        user_id: UserId,
        drafts: Vec<TransactionDraft>,
    ) -> Result<Vec<Transaction>, Error> {
        for draft in &drafts {
            draft.validate()?;
        }

        let connection = self.connection.lock().unwrap();

        // Dropping the transaction without committing rolls the whole batch
        // back, so a failure on any row leaves none of them behind.
        let tx = connection.unchecked_transaction()?;
        let mut inserted = Vec::with_capacity(drafts.len());

        for draft in &drafts {
            inserted.push(Self::insert_draft(&tx, user_id, draft)?);
        }

        tx.commit()?;

        Ok(inserted)
    }

    fn get(&self, user_id: UserId, id: TransactionId) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                 WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row((id, user_id.as_i64()), Self::map_row)?;

        Ok(transaction)
    }

    fn get_query(
        &self,
        user_id: UserId,
        filter: TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts =
            vec![format!("SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"")];
        let mut where_clause_parts = vec!["user_id = ?1".to_string()];
        let mut query_parameters = vec![Value::Integer(user_id.as_i64())];

        if let Some(account_id) = filter.account_id {
            where_clause_parts.push(format!("account_id = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(account_id));
        }

        if let Some(card_id) = filter.card_id {
            where_clause_parts.push(format!("card_id = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(card_id));
        }

        if let Some(group_id) = filter.group_id {
            where_clause_parts.push(format!("group_id = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(group_id));
        }

        if let Some(date_range) = filter.date_range {
            where_clause_parts.push(format!(
                "date BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Text(date_range.start().to_string()));
            query_parameters.push(Value::Text(date_range.end().to_string()));
        }

        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));

        match filter.sort_date {
            Some(SortOrder::Ascending) => query_string_parts.push("ORDER BY date ASC".to_string()),
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY date DESC".to_string())
            }
            None => {}
        }

        if let Some(limit) = filter.limit {
            query_string_parts.push(format!("LIMIT {limit}"));
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    fn set_settled(
        &mut self,
        user_id: UserId,
        id: TransactionId,
        settled: bool,
    ) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "UPDATE \"transaction\" SET settled = ?1
                 WHERE id = ?2 AND user_id = ?3
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row((settled, id, user_id.as_i64()), Self::map_row)?;

        Ok(transaction)
    }

    fn delete(&mut self, user_id: UserId, id: TransactionId) -> Result<(), Error> {
        let changed = self.connection.lock().unwrap().execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if changed == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    fn card_usage(&self, user_id: UserId, card_id: CardId) -> Result<i64, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT COALESCE(SUM(CASE kind
                    WHEN 'expense' THEN amount_cents
                    ELSE -amount_cents END), 0)
                 FROM \"transaction\" WHERE user_id = ?1 AND card_id = ?2",
            )?
            .query_row((user_id.as_i64(), card_id), |row| row.get(0))
            .map_err(|error| error.into())
    }
}

impl CreateTable for SqliteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS transaction_group (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL
                )",
            (),
        )?;

        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                account_id INTEGER,
                card_id INTEGER,
                amount_cents INTEGER NOT NULL,
                kind TEXT NOT NULL,
                date TEXT NOT NULL,
                settled INTEGER NOT NULL,
                group_id INTEGER,
                installment_number INTEGER,
                installment_total INTEGER,
                statement_due_date TEXT,
                description TEXT NOT NULL,
                category_id INTEGER,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE,
                FOREIGN KEY(card_id) REFERENCES card(id) ON UPDATE CASCADE,
                FOREIGN KEY(group_id) REFERENCES transaction_group(id) ON UPDATE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
            (),
        )?;

        // Ensure the sequence starts at 1
        connection.execute(
            "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
            (),
        )?;

        // Composite indexes used by the account history and group lookups.
        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_account_date
             ON \"transaction\"(account_id, date);",
            (),
        )?;
        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_group
             ON \"transaction\"(group_id);",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserId::new(row.get(offset + 1)?);
        let account_id = row.get(offset + 2)?;
        let card_id = row.get(offset + 3)?;
        let amount_cents = row.get(offset + 4)?;
        let kind = row.get(offset + 5)?;
        let date = row.get(offset + 6)?;
        let settled = row.get(offset + 7)?;
        let group_id = row.get(offset + 8)?;
        let installment_number = row.get(offset + 9)?;
        let installment_total = row.get(offset + 10)?;
        let statement_due_date = row.get(offset + 11)?;
        let description = row.get(offset + 12)?;
        let category_id = row.get(offset + 13)?;

        Ok(Transaction {
            id,
            user_id,
            account_id,
            card_id,
            amount_cents,
            kind,
            date,
            settled,
            group_id,
            installment_number,
            installment_total,
            statement_due_date,
            description,
            category_id,
        })
    }
}
