/// `BTreeMap`-backed versioned table.
pub mod memory;
/// SQLite-backed versioned table.
pub mod sqlite;

use thiserror::Error;

use crate::key::{Entry, StoreMutation};

/// Failure talking to a model table.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored cell could not be read back.
    #[error("corrupt table cell: {0}")]
    Corrupt(String),
}

/// Result alias for table operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Sorted, timestamp-versioned cell store holding model entries.
///
/// Per cell coordinate the newest timestamp wins. A delete at `t` hides
/// every version at or before `t`, including a put at exactly `t`.
pub trait ModelTable: Send {
    /// Applies every update of `mutation` atomically.
    fn apply(&mut self, mutation: &StoreMutation) -> PersistResult<()>;

    /// Applies several mutations, each atomic on its own row.
    fn apply_all(&mut self, mutations: &[StoreMutation]) -> PersistResult<()> {
        for mutation in mutations {
            self.apply(mutation)?;
        }
        Ok(())
    }

    /// Returns live cells in key order.
    fn scan(&self) -> PersistResult<Vec<Entry>>;

    /// Drops shadowed versions and delete markers, returning how many.
    fn compact(&mut self) -> PersistResult<usize> {
        Ok(0)
    }
}
