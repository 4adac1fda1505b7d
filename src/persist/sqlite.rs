//! SQLite-backed versioned model table.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::{
    key::{Entry, StoreKey, StoreMutation},
    types::Timestamp,
};

use super::{ModelTable, PersistError, PersistResult};

/// SQLite `synchronous` pragma level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Synchronous {
    /// No fsync.
    Off,
    /// Sync at critical moments.
    Normal,
    /// Sync on every commit.
    Full,
}

impl Synchronous {
    fn as_str(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Normal => "NORMAL",
            Self::Full => "FULL",
        }
    }
}

/// Connection settings for [`SqliteModelTable`].
#[derive(Debug, Clone)]
pub struct SqliteTableConfig {
    /// Use write-ahead logging. Ignored for in-memory databases.
    pub wal: bool,
    /// `synchronous` pragma.
    pub synchronous: Synchronous,
}

impl Default for SqliteTableConfig {
    fn default() -> Self {
        Self {
            wal: true,
            synchronous: Synchronous::Normal,
        }
    }
}

/// SQLite implementation of [`crate::persist::ModelTable`].
pub struct SqliteModelTable {
    conn: Connection,
}

impl SqliteModelTable {
    /// Opens or creates a table at `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        Self::open_with_config(path, &SqliteTableConfig::default())
    }

    /// Opens or creates a table at `path`.
    pub fn open_with_config(path: impl AsRef<Path>, config: &SqliteTableConfig) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn, config, true)
    }

    /// Opens an in-memory table.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn, &SqliteTableConfig::default(), false)
    }

    fn init_connection(conn: Connection, config: &SqliteTableConfig, on_disk: bool) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        if config.wal && on_disk {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }
        conn.pragma_update(None, "synchronous", config.synchronous.as_str())?;
        Ok(Self { conn })
    }

    /// Number of stored versions, including shadowed ones and delete markers.
    pub fn version_count(&self) -> PersistResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cells", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl ModelTable for SqliteModelTable {
    fn apply(&mut self, mutation: &StoreMutation) -> PersistResult<()> {
        if mutation.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        {
            let mut put = tx.prepare(
                "INSERT INTO cells(row_key, family, qualifier, visibility, ts, deleted, value)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
                 ON CONFLICT(row_key, family, qualifier, visibility, ts)
                 DO UPDATE SET value = excluded.value",
            )?;
            let mut delete = tx.prepare(
                "INSERT INTO cells(row_key, family, qualifier, visibility, ts, deleted, value)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, NULL)
                 ON CONFLICT(row_key, family, qualifier, visibility, ts)
                 DO UPDATE SET deleted = 1",
            )?;
            let row = mutation.row.as_bytes();
            for update in &mutation.updates {
                let family = update.family.as_bytes();
                let qualifier = update.qualifier.as_bytes();
                let visibility = update.visibility.as_bytes();
                let ts = i64::try_from(update.timestamp).map_err(|_| {
                    PersistError::Corrupt(format!("timestamp {} out of range", update.timestamp))
                })?;
                match &update.value {
                    Some(value) => {
                        put.execute(params![row, family, qualifier, visibility, ts, value])?;
                    }
                    None => {
                        delete.execute(params![row, family, qualifier, visibility, ts])?;
                    }
                }
            }
        }
        tx.commit()?;

        tracing::debug!(
            row = %mutation.row.escape_debug(),
            updates = mutation.updates.len(),
            "applied mutation to sqlite table"
        );
        Ok(())
    }

    fn scan(&self) -> PersistResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.row_key, c.family, c.qualifier, c.visibility, c.ts, c.value
             FROM cells c
             JOIN (
                 SELECT row_key, family, qualifier, visibility, MAX(ts) AS ts
                 FROM cells
                 GROUP BY row_key, family, qualifier, visibility
             ) latest
               ON c.row_key = latest.row_key
              AND c.family = latest.family
              AND c.qualifier = latest.qualifier
              AND c.visibility = latest.visibility
              AND c.ts = latest.ts
             WHERE c.deleted = 0
             ORDER BY c.row_key, c.family, c.qualifier, c.visibility",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, Vec<u8>>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, Vec<u8>>(2)?,
                row.get::<_, Vec<u8>>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, Option<Vec<u8>>>(5)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (r, family, qualifier, visibility, ts, value) = row?;
            let timestamp = Timestamp::try_from(ts)
                .map_err(|_| PersistError::Corrupt(format!("negative timestamp {ts}")))?;
            out.push(Entry {
                key: StoreKey {
                    row: text(r)?,
                    column_family: text(family)?,
                    column_qualifier: text(qualifier)?,
                    column_visibility: text(visibility)?,
                    timestamp,
                },
                value: value.unwrap_or_default(),
            });
        }
        Ok(out)
    }

    fn compact(&mut self) -> PersistResult<usize> {
        let tx = self.conn.transaction()?;
        let shadowed = tx.execute(
            "DELETE FROM cells WHERE EXISTS (
                 SELECT 1 FROM cells newer
                 WHERE newer.row_key = cells.row_key
                   AND newer.family = cells.family
                   AND newer.qualifier = cells.qualifier
                   AND newer.visibility = cells.visibility
                   AND newer.ts > cells.ts
             )",
            [],
        )?;
        let tombstones = tx.execute("DELETE FROM cells WHERE deleted = 1", [])?;
        tx.commit()?;
        Ok(shadowed + tombstones)
    }
}

fn text(bytes: Vec<u8>) -> PersistResult<String> {
    String::from_utf8(bytes).map_err(|e| PersistError::Corrupt(format!("non UTF-8 key part: {e}")))
}

