//! Store-side key, cell update, and row mutation types.

use serde::{Deserialize, Serialize};

use crate::{codec::grammar::SEP, types::Timestamp};

/// Value written for field-mapping puts; the key itself is the payload.
pub const EMPTY_VALUE: &[u8] = b"";

/// One cell coordinate in the sorted store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreKey {
    /// Row id.
    pub row: String,
    /// Column family.
    pub column_family: String,
    /// Column qualifier.
    pub column_qualifier: String,
    /// Access-control label, copied through untouched.
    pub column_visibility: String,
    /// Version timestamp.
    pub timestamp: Timestamp,
}

impl StoreKey {
    /// Builds a key from its parts.
    pub fn new(
        row: impl Into<String>,
        column_family: impl Into<String>,
        column_qualifier: impl Into<String>,
        column_visibility: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            row: row.into(),
            column_family: column_family.into(),
            column_qualifier: column_qualifier.into(),
            column_visibility: column_visibility.into(),
            timestamp,
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}:{} [{}] {}",
            self.row.escape_debug(),
            self.column_family.escape_debug(),
            self.column_qualifier.escape_debug(),
            self.column_visibility.escape_debug(),
            self.timestamp
        )
    }
}

/// Single put or delete within a row mutation.
///
/// `value == None` is a delete marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnUpdate {
    /// Column family.
    pub family: String,
    /// Column qualifier.
    pub qualifier: String,
    /// Access-control label.
    pub visibility: String,
    /// Version timestamp.
    pub timestamp: Timestamp,
    /// Cell value for puts, `None` for deletes.
    pub value: Option<Vec<u8>>,
}

impl ColumnUpdate {
    /// Returns true for a delete marker.
    pub fn is_delete(&self) -> bool {
        self.value.is_none()
    }
}

/// Ordered updates scoped to one row, applied atomically by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMutation {
    /// Target row.
    pub row: String,
    /// Updates in application order.
    pub updates: Vec<ColumnUpdate>,
}

impl StoreMutation {
    /// Creates an empty mutation for `row`.
    pub fn new(row: impl Into<String>) -> Self {
        Self {
            row: row.into(),
            updates: Vec::new(),
        }
    }

    /// Appends a put.
    pub fn put(
        &mut self,
        family: impl Into<String>,
        qualifier: impl Into<String>,
        visibility: impl Into<String>,
        timestamp: Timestamp,
        value: impl Into<Vec<u8>>,
    ) {
        self.updates.push(ColumnUpdate {
            family: family.into(),
            qualifier: qualifier.into(),
            visibility: visibility.into(),
            timestamp,
            value: Some(value.into()),
        });
    }

    /// Appends a delete.
    pub fn put_delete(
        &mut self,
        family: impl Into<String>,
        qualifier: impl Into<String>,
        visibility: impl Into<String>,
        timestamp: Timestamp,
    ) {
        self.updates.push(ColumnUpdate {
            family: family.into(),
            qualifier: qualifier.into(),
            visibility: visibility.into(),
            timestamp,
            value: None,
        });
    }

    /// Full key of the update at `idx`.
    pub fn key_at(&self, idx: usize) -> Option<StoreKey> {
        self.updates.get(idx).map(|u| StoreKey {
            row: self.row.clone(),
            column_family: u.family.clone(),
            column_qualifier: u.qualifier.clone(),
            column_visibility: u.visibility.clone(),
            timestamp: u.timestamp,
        })
    }

    /// Returns true when no updates are present.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Live cell returned by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Cell key.
    pub key: StoreKey,
    /// Cell value.
    pub value: Vec<u8>,
}

impl Entry {
    /// Model name, the first part of the column family.
    pub fn model_name(&self) -> &str {
        self.key
            .column_family
            .split(SEP)
            .next()
            .unwrap_or_default()
    }
}
