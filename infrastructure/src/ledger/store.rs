//! File ledger
//!
//! One JSON file per committed record plus an index file naming them in
//! commit order. Every write lands in a temporary file first and is
//! renamed into place; the index rename is the commit point, so a crash
//! mid-commit leaves at worst an orphan record file that no index entry
//! references and no reader ever sees.

use async_trait::async_trait;
use boardroom_application::{DecisionLedger, LedgerRecord, PersistenceError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerCounts {
    cycles: u64,
    outcome_batches: u64,
    reputation_deltas: u64,
    failure_patterns: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerIndex {
    version: u32,
    updated_at: Option<DateTime<Utc>>,
    /// Record file names, oldest first.
    records: Vec<String>,
    counts: LedgerCounts,
}

impl Default for LedgerIndex {
    fn default() -> Self {
        Self {
            version: 1,
            updated_at: None,
            records: Vec::new(),
            counts: LedgerCounts::default(),
        }
    }
}

/// Durable ledger rooted at a directory.
pub struct FileLedger {
    root: PathBuf,
    /// Commits are single-writer; readers never lock.
    write_lock: Mutex<()>,
}

impl FileLedger {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn records_dir(&self) -> PathBuf {
        self.root.join("records")
    }

    async fn read_index(&self) -> Result<LedgerIndex, PersistenceError> {
        let path = self.index_path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| PersistenceError::Corrupt(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LedgerIndex::default()),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// Serialize to a temp file, fsync-free rename into place.
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
        let Some(parent) = path.parent() else {
            return Err(PersistenceError::Io(format!(
                "no parent directory for {}",
                path.display()
            )));
        };
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(parent, e))?;

        let tmp = parent.join(format!(
            ".tmp-{}",
            path.file_name().and_then(|n| n.to_str()).unwrap_or("record")
        ));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| io_error(path, e))?;
        Ok(())
    }
}

fn io_error(path: &Path, error: std::io::Error) -> PersistenceError {
    PersistenceError::Io(format!("{}: {}", path.display(), error))
}

#[async_trait]
impl DecisionLedger for FileLedger {
    async fn commit(&self, record: &LedgerRecord) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock().await;

        let mut index = self.read_index().await?;
        let file_name = format!("{:06}.json", index.records.len());
        let record_path = self.records_dir().join(&file_name);

        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        self.write_atomic(&record_path, &bytes).await?;

        match record {
            LedgerRecord::Cycle(bundle) => {
                index.counts.cycles += 1;
                index.counts.reputation_deltas += bundle.reputation_deltas.len() as u64;
                index.counts.failure_patterns += bundle.new_patterns.len() as u64;
            }
            LedgerRecord::OutcomeScores(batch) => {
                index.counts.outcome_batches += 1;
                index.counts.reputation_deltas += batch.deltas.len() as u64;
                index.counts.failure_patterns += batch.new_patterns.len() as u64;
            }
        }
        index.records.push(file_name);
        index.updated_at = Some(Utc::now());

        let index_bytes = serde_json::to_vec_pretty(&index)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        // The index rename publishes the record.
        self.write_atomic(&self.index_path(), &index_bytes).await?;

        debug!(cycle = %record.cycle_id(), records = index.records.len(), "ledger record committed");
        Ok(())
    }

    async fn restore(&self) -> Result<Vec<LedgerRecord>, PersistenceError> {
        let index = self.read_index().await?;
        let mut records = Vec::with_capacity(index.records.len());

        for file_name in &index.records {
            let path = self.records_dir().join(file_name);
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                PersistenceError::Corrupt(format!(
                    "index names {} but it cannot be read: {}",
                    path.display(),
                    e
                ))
            })?;
            let record: LedgerRecord = serde_json::from_slice(&bytes)
                .map_err(|e| PersistenceError::Corrupt(format!("{}: {}", path.display(), e)))?;
            records.push(record);
        }

        info!(records = records.len(), "ledger restored");
        Ok(records)
    }
}
