//! Implements a SQLite backed card store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    database_id::CardId,
    db::{CreateTable, MapRow},
    models::{Card, UserId},
    stores::CardStore,
};

/// Stores credit cards and their statement cycle configuration in a SQLite
/// database.
#[derive(Debug, Clone)]
pub struct SqliteCardStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCardStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CardStore for SqliteCardStore {
    fn create(
        &mut self,
        user_id: UserId,
        name: &str,
        close_day: u8,
        due_day: u8,
        limit_cents: i64,
    ) -> Result<Card, Error> {
        for (label, day) in [("close", close_day), ("due", due_day)] {
            if !(1..=31).contains(&day) {
                return Err(Error::InvalidSchedule(format!(
                    "the statement {label} day must be between 1 and 31, got {day}"
                )));
            }
        }

        let card = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO card (user_id, name, close_day, due_day, limit_cents, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)
                 RETURNING id, user_id, name, close_day, due_day, limit_cents, active",
            )?
            .query_row(
                (user_id.as_i64(), name, close_day, due_day, limit_cents),
                Self::map_row,
            )?;

        Ok(card)
    }

    fn get(&self, user_id: UserId, id: CardId) -> Result<Card, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, name, close_day, due_day, limit_cents, active FROM card
                 WHERE id = ?1 AND user_id = ?2",
            )?
            .query_row((id, user_id.as_i64()), Self::map_row)
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => Error::CardNotFound(id),
                error => error.into(),
            })
    }

    fn get_all(&self, user_id: UserId) -> Result<Vec<Card>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, user_id, name, close_day, due_day, limit_cents, active FROM card
                 WHERE user_id = ?1 ORDER BY name ASC",
            )?
            .query_map((user_id.as_i64(),), Self::map_row)?
            .map(|maybe_card| maybe_card.map_err(Error::SqlError))
            .collect()
    }

    fn deactivate(&mut self, user_id: UserId, id: CardId) -> Result<(), Error> {
        let changed = self.connection.lock().unwrap().execute(
            "UPDATE card SET active = 0 WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if changed == 0 {
            Err(Error::CardNotFound(id))
        } else {
            Ok(())
        }
    }
}

impl CreateTable for SqliteCardStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS card (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                close_day INTEGER NOT NULL,
                due_day INTEGER NOT NULL,
                limit_cents INTEGER NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteCardStore {
    type ReturnType = Card;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserId::new(row.get(offset + 1)?);
        let name = row.get(offset + 2)?;
        let close_day = row.get(offset + 3)?;
        let due_day = row.get(offset + 4)?;
        let limit_cents = row.get(offset + 5)?;
        let active = row.get(offset + 6)?;

        Ok(Card {
            id,
            user_id,
            name,
            close_day,
            due_day,
            limit_cents,
            active,
        })
    }
}

#[cfg(test)]
mod sqlite_card_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{Error, db::initialize, models::UserId, stores::CardStore};

    use super::SqliteCardStore;

    fn get_test_store() -> SqliteCardStore {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        SqliteCardStore::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn create_succeeds() {
        let mut store = get_test_store();

        let card = store
            .create(UserId::new(1), "Platinum", 28, 10, 500_000)
            .expect("Could not create card");

        assert!(card.id > 0);
        assert_eq!(card.close_day, 28);
        assert_eq!(card.due_day, 10);
        assert!(card.active);
    }

    #[test]
    fn create_rejects_out_of_range_days() {
        let mut store = get_test_store();

        for (close_day, due_day) in [(0, 10), (32, 10), (28, 0), (28, 32)] {
            let result = store.create(UserId::new(1), "Platinum", close_day, due_day, 0);

            assert!(
                matches!(result, Err(Error::InvalidSchedule(_))),
                "want InvalidSchedule for close {close_day} due {due_day}, got {result:?}"
            );
        }
    }

    #[test]
    fn get_fails_for_other_users_card() {
        let mut store = get_test_store();
        let card = store.create(UserId::new(1), "Platinum", 28, 10, 0).unwrap();

        let got = store.get(UserId::new(2), card.id);

        assert_eq!(got, Err(Error::CardNotFound(card.id)));
    }

    #[test]
    fn deactivate_clears_active_flag() {
        let mut store = get_test_store();
        let user_id = UserId::new(1);
        let card = store.create(user_id, "Platinum", 28, 10, 0).unwrap();

        store.deactivate(user_id, card.id).unwrap();

        assert!(!store.get(user_id, card.id).unwrap().active);
    }

    #[test]
    fn deactivate_fails_on_missing_card() {
        let mut store = get_test_store();

        let result = store.deactivate(UserId::new(1), 42);

        assert_eq!(result, Err(Error::CardNotFound(42)));
    }
}
