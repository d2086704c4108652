//! Key/value record store abstraction.
//!
//! # Responsibility
//! - Define the synchronous get/put/keys contract the note repository uses.
//! - Provide in-memory and SQLite backends.
//!
//! # Invariants
//! - Keys are note names, compared case-sensitively and never rewritten.
//! - Values are opaque serialized records; backends never inspect them.
//! - A single `put` is atomic; nothing spans multiple keys.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport-level failure of a record store backend.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Connection schema lacks a table the backend requires.
    MissingRequiredTable(&'static str),
    /// Backend refused or could not serve the request.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "record store is missing required table `{table}`")
            }
            Self::Unavailable(message) => write!(f, "record store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous key/value store holding one serialized record per note name.
pub trait RecordStore {
    /// Returns the raw record stored under `name`.
    fn get(&self, name: &str) -> StoreResult<Option<String>>;
    /// Inserts or replaces the record stored under `name`.
    fn put(&mut self, name: &str, body: &str) -> StoreResult<()>;
    /// Returns every stored key.
    fn keys(&self) -> StoreResult<Vec<String>>;
}

impl<S: RecordStore + ?Sized> RecordStore for &mut S {
    fn get(&self, name: &str) -> StoreResult<Option<String>> {
        (**self).get(name)
    }

    fn put(&mut self, name: &str, body: &str) -> StoreResult<()> {
        (**self).put(name, body)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        (**self).keys()
    }
}
