//! Key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide `get_item`/`set_item`/`remove_item` over named entries.
//! - Verify the backing connection is migrated before use.
//!
//! # Invariants
//! - `set_item` is an upsert: exactly one row per key.
//! - Repositories sharing one database observe each other's writes
//!   immediately; nothing is cached here.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-layer error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "storage table `{table}` is missing; was the database migrated?")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Named-entry durable storage.
pub trait KvRepository {
    /// Returns the stored value, or `None` when the key was never written.
    fn get_item(&self, key: &str) -> RepoResult<Option<String>>;
    /// Inserts or replaces the value stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Deletes `key`; returns whether an entry existed.
    fn remove_item(&self, key: &str) -> RepoResult<bool>;
}

impl<R: KvRepository + ?Sized> KvRepository for &R {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> RepoResult<bool> {
        (**self).remove_item(key)
    }
}

/// SQLite-backed key-value repository over the `kv_entries` table.
pub struct SqliteKvRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    ///
    /// # Errors
    /// - `MissingRequiredTable` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn, "kv_entries")? {
            return Err(RepoError::MissingRequiredTable("kv_entries"));
        }
        Ok(Self { conn })
    }
}

impl KvRepository for SqliteKvRepository<'_> {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
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
