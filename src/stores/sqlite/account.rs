//! Implements a SQLite backed account store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    database_id::AccountId,
    db::{CreateTable, MapRow},
    models::{Account, UserId},
    stores::AccountStore,
};

/// Stores accounts and their denormalized balances in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteAccountStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteAccountStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl AccountStore for SqliteAccountStore {
    fn create(
        &mut self,
        user_id: UserId,
        name: &str,
        opening_balance_cents: i64,
    ) -> Result<Account, Error> {
        let account = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO account (user_id, name, balance_cents, active)
                 VALUES (?1, ?2, ?3, 1)
                 RETURNING id, user_id, name, balance_cents, active",
            )?
            .query_row((user_id.as_i64(), name, opening_balance_cents), Self::map_row)?;

        Ok(account)
    }

    fn get(&self, user_id: UserId, id: AccountId) -> Result<Account, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, name, balance_cents, active FROM account
                 WHERE id = ?1 AND user_id = ?2",
            )?
            .query_row((id, user_id.as_i64()), Self::map_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::AccountNotFound(id),
                error => error.into(),
            })
    }

    fn get_all(&self, user_id: UserId) -> Result<Vec<Account>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, name, balance_cents, active FROM account
                 WHERE user_id = ?1 ORDER BY name ASC",
            )?
            .query_map((user_id.as_i64(),), Self::map_row)?
            .map(|maybe_account| maybe_account.map_err(Error::SqlError))
            .collect()
    }

    fn set_balance(
        &mut self,
        user_id: UserId,
        id: AccountId,
        balance_cents: i64,
    ) -> Result<i64, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "UPDATE account SET balance_cents = ?1
                 WHERE id = ?2 AND user_id = ?3
                 RETURNING balance_cents",
            )?
            .query_row((balance_cents, id, user_id.as_i64()), |row| row.get(0))
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::AccountNotFound(id),
                error => error.into(),
            })
    }

    fn deactivate(&mut self, user_id: UserId, id: AccountId) -> Result<(), Error> {
        let changed = self.connection.lock().unwrap().execute(
            "UPDATE account SET active = 0 WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if changed == 0 {
            Err(Error::AccountNotFound(id))
        } else {
            Ok(())
        }
    }

    fn total_balance(&self, user_id: UserId) -> Result<i64, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT COALESCE(SUM(balance_cents), 0) FROM account WHERE user_id = ?1")?
            .query_row((user_id.as_i64(),), |row| row.get(0))
            .map_err(|error| error.into())
    }
}

impl CreateTable for SqliteAccountStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                balance_cents INTEGER NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteAccountStore {
    type ReturnType = Account;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserId::new(row.get(offset + 1)?);
        let name = row.get(offset + 2)?;
        let balance_cents = row.get(offset + 3)?;
        let active = row.get(offset + 4)?;

        Ok(Account {
            id,
            user_id,
            name,
            balance_cents,
            active,
        })
    }
}

#[cfg(test)]
mod sqlite_account_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{Error, db::initialize, models::UserId, stores::AccountStore};

    use super::SqliteAccountStore;

    fn get_test_store() -> SqliteAccountStore {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        SqliteAccountStore::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn create_succeeds() {
        let mut store = get_test_store();

        let account = store
            .create(UserId::new(1), "Checking", 12_500)
            .expect("Could not create account");

        assert!(account.id > 0);
        assert_eq!(account.name, "Checking");
        assert_eq!(account.balance_cents, 12_500);
        assert!(account.active);
    }

    #[test]
    fn get_returns_created_account() {
        let mut store = get_test_store();
        let user_id = UserId::new(1);
        let want = store.create(user_id, "Savings", 0).unwrap();

        let got = store.get(user_id, want.id);

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn get_fails_for_other_users_account() {
        let mut store = get_test_store();
        let account = store.create(UserId::new(1), "Checking", 0).unwrap();

        let got = store.get(UserId::new(2), account.id);

        assert_eq!(got, Err(Error::AccountNotFound(account.id)));
    }

    #[test]
    fn get_all_is_scoped_to_the_user() {
        let mut store = get_test_store();
        let user_id = UserId::new(1);
        store.create(user_id, "Checking", 100).unwrap();
        store.create(user_id, "Savings", 200).unwrap();
        store.create(UserId::new(2), "Other", 300).unwrap();

        let accounts = store.get_all(user_id).unwrap();

        assert_eq!(accounts.len(), 2);
        assert!(accounts.iter().all(|account| account.user_id == user_id));
    }

    #[test]
    fn set_balance_returns_new_value() {
        let mut store = get_test_store();
        let user_id = UserId::new(1);
        let account = store.create(user_id, "Checking", 500).unwrap();

        let balance = store.set_balance(user_id, account.id, -300).unwrap();

        assert_eq!(balance, -300);
        assert_eq!(store.get(user_id, account.id).unwrap().balance_cents, -300);
    }

    #[test]
    fn set_balance_fails_on_missing_account() {
        let mut store = get_test_store();

        let result = store.set_balance(UserId::new(1), 42, 100);

        assert_eq!(result, Err(Error::AccountNotFound(42)));
    }

    #[test]
    fn deactivate_clears_active_flag() {
        let mut store = get_test_store();
        let user_id = UserId::new(1);
        let account = store.create(user_id, "Checking", 0).unwrap();

        store.deactivate(user_id, account.id).unwrap();

        assert!(!store.get(user_id, account.id).unwrap().active);
    }

    #[test]
    fn total_balance_sums_the_users_accounts() {
        let mut store = get_test_store();
        let user_id = UserId::new(1);
        store.create(user_id, "Checking", 10_050).unwrap();
        store.create(user_id, "Savings", 25_075).unwrap();
        store.create(user_id, "Overdrawn", -5_025).unwrap();
        store.create(UserId::new(2), "Other", 99_999).unwrap();

        let total = store.total_balance(user_id).unwrap();

        assert_eq!(total, 30_100);
    }

    #[test]
    fn total_balance_is_zero_without_accounts() {
        let store = get_test_store();

        assert_eq!(store.total_balance(UserId::new(1)), Ok(0));
    }
}
