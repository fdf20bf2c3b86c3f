use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::domain::{format_entry_date, parse_entry_date, Cents, Entry, EntryId, EntryType, NewEntry};

use super::MIGRATION_001_ENTRIES;

/// Durable store for income/expense entries, backed by a single SQLite table.
///
/// The store holds one pool for the lifetime of the process; every operation
/// is a single statement against it.
pub struct EntryStore {
    pool: SqlitePool,
}

impl EntryStore {
    /// Create a new store with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        // One connection is all a single-user dashboard needs, and it keeps
        // `sqlite::memory:` databases consistent across calls.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self::new(pool))
    }

    /// Create the entries table if it is missing. Safe to call repeatedly.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_ENTRIES)
            .execute(&self.pool)
            .await
            .context("Failed to create entries table")?;
        tracing::debug!("entries table ready");
        Ok(())
    }

    /// Connect and initialize in one step.
    pub async fn open(database_url: &str) -> Result<Self> {
        let store = Self::connect(database_url).await?;
        store.initialize().await?;
        Ok(store)
    }

    /// Insert a new entry and return the id the database assigned to it.
    pub async fn insert(&self, entry: &NewEntry) -> Result<EntryId> {
        let result = sqlx::query(
            r#"
            INSERT INTO entries (Name, Date, Type, Value)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&entry.name)
        .bind(format_entry_date(entry.date))
        .bind(entry.entry_type.as_str())
        .bind(entry.value)
        .execute(&self.pool)
        .await
        .context("Failed to insert entry")?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, name = %entry.name, "inserted entry");
        Ok(id)
    }

    /// Delete an entry by id. Returns whether a row was removed;
    /// an unknown id is not an error.
    pub async fn delete(&self, id: EntryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete entry")?;

        let removed = result.rows_affected() > 0;
        tracing::debug!(id, removed, "delete entry");
        Ok(removed)
    }

    /// Get a single entry by id.
    pub async fn get(&self, id: EntryId) -> Result<Option<Entry>> {
        let row = sqlx::query(
            r#"
            SELECT id, Name, Date, Type, Value
            FROM entries
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch entry")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// List every entry in insertion order. Empty when the store has no rows.
    pub async fn list_all(&self) -> Result<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, Name, Date, Type, Value
            FROM entries
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Delete every entry. Returns the number of rows removed.
    pub async fn reset(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM entries")
            .execute(&self.pool)
            .await
            .context("Failed to reset entries")?;
        Ok(result.rows_affected())
    }

    /// Number of stored entries.
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM entries")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count entries")?;
        Ok(row.get("count"))
    }

    /// Sum of values for one entry type, computed by SQLite.
    pub async fn total(&self, entry_type: EntryType) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(Value), 0) as total
            FROM entries
            WHERE Type = ?
            "#,
        )
        .bind(entry_type.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum entries by type")?;

        Ok(row.get("total"))
    }

    fn row_to_entry(row: &SqliteRow) -> Result<Entry> {
        let id: EntryId = row.get("id");
        let date_str: String = row.get("Date");
        let type_str: String = row.get("Type");

        Ok(Entry {
            id,
            name: row.get("Name"),
            date: parse_entry_date(&date_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid date '{}' in entry {}", date_str, id))?,
            entry_type: EntryType::from_str(&type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid type '{}' in entry {}", type_str, id))?,
            value: row.get("Value"),
        })
    }
}
