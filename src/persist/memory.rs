use std::collections::BTreeMap;

use crate::{
    key::{Entry, StoreKey, StoreMutation},
    types::Timestamp,
};

use super::{ModelTable, PersistResult};

type Coord = (String, String, String, String);

#[derive(Debug, Clone, Default)]
struct Version {
    value: Option<Vec<u8>>,
    deleted: bool,
}

/// In-memory [`ModelTable`].
#[derive(Debug, Default)]
pub struct MemoryTable {
    cells: BTreeMap<Coord, BTreeMap<Timestamp, Version>>,
}

impl MemoryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored versions, including shadowed ones and delete markers.
    pub fn version_count(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }
}

impl ModelTable for MemoryTable {
    fn apply(&mut self, mutation: &StoreMutation) -> PersistResult<()> {
        for update in &mutation.updates {
            let coord = (
                mutation.row.clone(),
                update.family.clone(),
                update.qualifier.clone(),
                update.visibility.clone(),
            );
            let version = self
                .cells
                .entry(coord)
                .or_default()
                .entry(update.timestamp)
                .or_default();
            match &update.value {
                Some(value) => version.value = Some(value.clone()),
                None => version.deleted = true,
            }
        }
        tracing::debug!(
            row = %mutation.row.escape_debug(),
            updates = mutation.updates.len(),
            "applied mutation to memory table"
        );
        Ok(())
    }

    fn scan(&self) -> PersistResult<Vec<Entry>> {
        let out = self
            .cells
            .iter()
            .filter_map(|((row, family, qualifier, visibility), versions)| {
                let (ts, latest) = versions.last_key_value()?;
                if latest.deleted {
                    return None;
                }
                let value = latest.value.clone()?;
                Some(Entry {
                    key: StoreKey::new(
                        row.clone(),
                        family.clone(),
                        qualifier.clone(),
                        visibility.clone(),
                        *ts,
                    ),
                    value,
                })
            })
            .collect();
        Ok(out)
    }

    fn compact(&mut self) -> PersistResult<usize> {
        let before = self.version_count();
        self.cells.retain(|_, versions| {
            let Some((ts, latest)) = versions.pop_last() else {
                return false;
            };
            versions.clear();
            if latest.deleted {
                return false;
            }
            versions.insert(ts, latest);
            true
        });
        Ok(before - self.version_count())
    }
}
