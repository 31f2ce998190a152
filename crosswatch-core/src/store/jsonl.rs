//! JSONL file-backed condition store.
//!
//! One `PendingCondition` JSON object per line. The file is read once on
//! open; every mutation rewrites it atomically (write `.tmp`, rename into
//! place), so a crash leaves either the old or the new contents.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{MemoryConditionStore, PrimaryConditionStore, StoreError};
use crate::domain::{ConditionType, PendingCondition};

pub struct JsonlConditionStore {
    path: PathBuf,
    inner: MemoryConditionStore,
}

impl JsonlConditionStore {
    /// Open a store file, creating an empty store if the file does not exist.
    ///
    /// Blank lines are skipped. An unparseable line or a repeated id is
    /// `StoreError::Corrupt`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let conditions = match fs::File::open(&path) {
            Ok(file) => read_conditions(io::BufReader::new(file))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(
            path = %path.display(),
            count = conditions.len(),
            "opened condition store"
        );
        Ok(Self {
            path,
            inner: MemoryConditionStore::from_conditions(conditions),
        })
    }

    /// Path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("jsonl.tmp");
        {
            let mut writer = io::BufWriter::new(fs::File::create(&tmp_path)?);
            for condition in self.inner.iter() {
                serde_json::to_writer(&mut writer, condition)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::Io(e)
        })
    }

    /// Apply a mutation and persist it; on a failed write the in-memory state is rolled back.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut MemoryConditionStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let snapshot = self.inner.clone();
        let result = op(&mut self.inner)?;
        if let Err(e) = self.persist() {
            self.inner = snapshot;
            return Err(e);
        }
        Ok(result)
    }
}

fn read_conditions(reader: impl BufRead) -> Result<Vec<PendingCondition>, StoreError> {
    let mut conditions = Vec::new();
    let mut seen = HashSet::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let condition: PendingCondition =
            serde_json::from_str(&line).map_err(|e| StoreError::Corrupt {
                line: index + 1,
                reason: e.to_string(),
            })?;
        if !seen.insert(condition.id) {
            return Err(StoreError::Corrupt {
                line: index + 1,
                reason: format!("duplicate condition id {}", condition.id),
            });
        }
        conditions.push(condition);
    }
    Ok(conditions)
}

impl PrimaryConditionStore for JsonlConditionStore {
    fn save(
        &mut self,
        symbol: &str,
        condition_type: ConditionType,
        occurrence_date: NaiveDate,
    ) -> Result<PendingCondition, StoreError> {
        self.mutate(|inner| inner.save(symbol, condition_type, occurrence_date))
    }

    fn find_active(
        &self,
        symbol: &str,
        condition_type: ConditionType,
        after: NaiveDate,
    ) -> Result<Vec<PendingCondition>, StoreError> {
        self.inner.find_active(symbol, condition_type, after)
    }

    fn delete(&mut self, condition: &PendingCondition) -> Result<(), StoreError> {
        if !self.inner.contains(condition.id) {
            return Ok(());
        }
        self.mutate(|inner| inner.delete(condition))
    }

    fn list(&self, symbol: Option<&str>) -> Result<Vec<PendingCondition>, StoreError> {
        self.inner.list(symbol)
    }

    fn purge_expired(
        &mut self,
        symbol: Option<&str>,
        cutoff: NaiveDate,
    ) -> Result<usize, StoreError> {
        let expired = self
            .inner
            .list(symbol)?
            .iter()
            .filter(|c| c.occurrence_date <= cutoff)
            .count();
        if expired == 0 {
            return Ok(0);
        }
        self.mutate(|inner| inner.purge_expired(symbol, cutoff))
    }
}
