//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    database_id::CategoryId,
    db::{CreateTable, MapRow},
    models::{Category, UserId},
    stores::CategoryStore,
};

/// Stores categories in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCategoryStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CategoryStore for SqliteCategoryStore {
    fn create(&mut self, user_id: UserId, name: &str) -> Result<Category, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO category (user_id, name) VALUES (?1, ?2)
                 RETURNING id, user_id, name",
            )?
            .query_row((user_id.as_i64(), name), Self::map_row)?;

        Ok(category)
    }

    fn get(&self, user_id: UserId, id: CategoryId) -> Result<Category, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare("SELECT id, user_id, name FROM category WHERE id = ?1 AND user_id = ?2")?
            .query_row((id, user_id.as_i64()), Self::map_row)?;

        Ok(category)
    }

    fn get_all(&self, user_id: UserId) -> Result<Vec<Category>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, user_id, name FROM category WHERE user_id = ?1 ORDER BY name ASC")?
            .query_map((user_id.as_i64(),), Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(Error::SqlError))
            .collect()
    }
}

impl CreateTable for SqliteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL
                )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = UserId::new(row.get(offset + 1)?);
        let name = row.get(offset + 2)?;

        Ok(Category { id, user_id, name })
    }
}
