//! JSON-lines reading store.
//!
//! One [`StoredRow`] per line, appended in insertion order, so the most
//! recent row is the last line.  The file is scanned once at open to
//! recover that row; afterwards the last row written is served from
//! memory.  The column set lives in the adapter and is rebuilt at
//! startup by schema sync; dropping a column hides it from new rows but
//! leaves history untouched.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::memory_store::project;
use crate::app::ports::{ReadingStore, StoreError};
use crate::reading::{ReadingSet, StoredRow};

pub struct JsonlStore {
    path: PathBuf,
    columns: BTreeSet<String>,
    last: Option<StoredRow>,
}

impl JsonlStore {
    /// Use `path`, creating parent directories as needed.  The file
    /// itself is created on the first insert.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_err(&path, &e))?;
        }
        let last = match read_last_row(&path) {
            Ok(row) => row,
            Err(e) => {
                warn!("JsonlStore: ignoring unreadable history: {}", e);
                None
            }
        };
        info!("JsonlStore: rows in {}", path.display());
        Ok(Self {
            path,
            columns: BTreeSet::new(),
            last,
        })
    }
}

/// Last non-empty line of the file, parsed.
fn read_last_row(path: &Path) -> Result<Option<StoredRow>, StoreError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(path, &e)),
    };
    let mut last = None;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| io_err(path, &e))?;
        if !line.trim().is_empty() {
            last = Some(line);
        }
    }
    last.map(|l| serde_json::from_str::<StoredRow>(&l))
        .transpose()
        .map_err(|e| StoreError::Corrupted(e.to_string()))
}

fn io_err(path: &Path, e: &std::io::Error) -> StoreError {
    StoreError::IoError(format!("{}: {}", path.display(), e))
}

impl ReadingStore for JsonlStore {
    fn add_column(&mut self, name: &str) -> Result<bool, StoreError> {
        Ok(self.columns.insert(name.to_string()))
    }

    fn drop_column(&mut self, name: &str) -> Result<bool, StoreError> {
        Ok(self.columns.remove(name))
    }

    fn insert_row(
        &mut self,
        timestamp: DateTime<Utc>,
        readings: &ReadingSet,
    ) -> Result<(), StoreError> {
        let row = project(&self.columns, timestamp, readings);
        let line = serde_json::to_string(&row).map_err(|e| StoreError::Corrupted(e.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_err(&self.path, &e))?;
        writeln!(file, "{line}").map_err(|e| io_err(&self.path, &e))?;
        debug!("JsonlStore: appended row at {}", timestamp);
        self.last = Some(row);
        Ok(())
    }

    fn latest_row(&self) -> Result<Option<StoredRow>, StoreError> {
        Ok(self.last.clone())
    }
}
