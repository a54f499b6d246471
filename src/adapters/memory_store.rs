//! In-memory reading store.
//!
//! Implements [`ReadingStore`] with a column set and a bounded ring of
//! recent rows; the oldest row is evicted once the ring is full.  Used
//! when no persistent backend is configured, and as the reference
//! semantics for the file-backed store.

use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::app::ports::{ReadingStore, StoreError};
use crate::reading::{ReadingSet, StoredRow};

/// Rows kept by [`MemoryStore::new`]: one day at the default interval.
pub const DEFAULT_HISTORY: usize = 288;

#[derive(Debug)]
pub struct MemoryStore {
    columns: BTreeSet<String>,
    rows: VecDeque<StoredRow>,
    history: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_history(DEFAULT_HISTORY)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `history` rows (at least one).
    pub fn with_history(history: usize) -> Self {
        let history = history.max(1);
        Self {
            columns: BTreeSet::new(),
            rows: VecDeque::with_capacity(history),
            history,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Retained rows, oldest first.
    pub fn rows(&self) -> impl Iterator<Item = &StoredRow> {
        self.rows.iter()
    }
}

/// Keep only the readings whose column exists.
pub(crate) fn project(
    columns: &BTreeSet<String>,
    timestamp: DateTime<Utc>,
    readings: &ReadingSet,
) -> StoredRow {
    let mut row = StoredRow::from_readings(timestamp, readings);
    row.values.retain(|column, _| {
        let known = columns.contains(column);
        if !known {
            warn!("Store: no column '{}', reading not stored", column);
        }
        known
    });
    row
}

impl ReadingStore for MemoryStore {
    fn add_column(&mut self, name: &str) -> Result<bool, StoreError> {
        let added = self.columns.insert(name.to_string());
        if added {
            debug!("MemoryStore: added column '{}'", name);
        }
        Ok(added)
    }

    fn drop_column(&mut self, name: &str) -> Result<bool, StoreError> {
        let removed = self.columns.remove(name);
        if removed {
            for row in &mut self.rows {
                row.values.remove(name);
            }
            debug!("MemoryStore: dropped column '{}'", name);
        }
        Ok(removed)
    }

    fn insert_row(
        &mut self,
        timestamp: DateTime<Utc>,
        readings: &ReadingSet,
    ) -> Result<(), StoreError> {
        let row = project(&self.columns, timestamp, readings);
        if self.rows.len() == self.history {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
        Ok(())
    }

    fn latest_row(&self) -> Result<Option<StoredRow>, StoreError> {
        Ok(self.rows.back().cloned())
    }
}
