//! SQLite-backed record store over the `records` table.
//!
//! # Invariants
//! - The connection must already be migrated (see `db::open_db`).
//! - `put` is a single upsert statement, atomic per record.

use super::{RecordStore, StoreError, StoreResult};
use rusqlite::{params, Connection};

/// Durable record store borrowing a migrated connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a ready connection, rejecting schemas without `records`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        if !table_exists(conn, "records")? {
            return Err(StoreError::MissingRequiredTable("records"));
        }
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn get(&self, name: &str) -> StoreResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT body FROM records WHERE name = ?1;")?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }
        Ok(None)
    }

    fn put(&mut self, name: &str, body: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO records (name, body)
             VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET body = excluded.body;",
            params![name, body],
        )?;
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM records ORDER BY name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
