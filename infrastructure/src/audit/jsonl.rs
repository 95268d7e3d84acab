//! JSONL audit sink
//!
//! Each [`AuditEntry`] is serialized as a single JSON line and appended
//! via a buffered writer. Thread-safe via `Mutex<BufWriter<File>>`; the
//! single `writeln!` per entry keeps concurrent appends from
//! interleaving partial lines. Flushes on every entry and on `Drop`.

use boardroom_domain::{AuditEntry, AuditSink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Audit sink that appends one JSON object per line.
pub struct JsonlAuditSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Open the audit log for appending, creating the file (and parent
    /// directories) if needed. Returns `None` if the file cannot be
    /// opened — a missing audit log downgrades to a warning rather than
    /// blocking governance.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create audit log directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, entry: AuditEntry) {
        let Ok(line) = serde_json::to_string(&entry) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // Flush per entry: audit lines must survive a crash
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlAuditSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardroom_domain::{AccessAction, AuditOutcome, ResourceCategory};

    #[test]
    fn test_entries_append_as_parseable_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = JsonlAuditSink::new(&path).unwrap();

        sink.record(AuditEntry::new(
            "marketing",
            ResourceCategory::Finances,
            AccessAction::Write,
            AuditOutcome::Denied,
        ));
        sink.record(AuditEntry::new(
            "system",
            ResourceCategory::MemorySystem,
            AccessAction::Write,
            AuditOutcome::Allowed,
        ));

        let content = std::fs::read_to_string(&path).unwrap();
        let entries: Vec<AuditEntry> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].principal, "marketing");
        assert_eq!(entries[0].outcome, AuditOutcome::Denied);
        assert_eq!(entries[1].principal, "system");
    }

    #[test]
    fn test_reopening_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        {
            let sink = JsonlAuditSink::new(&path).unwrap();
            sink.record(AuditEntry::new(
                "qa",
                ResourceCategory::Board,
                AccessAction::Read,
                AuditOutcome::Allowed,
            ));
        }
        {
            let sink = JsonlAuditSink::new(&path).unwrap();
            sink.record(AuditEntry::new(
                "qa",
                ResourceCategory::Board,
                AccessAction::Write,
                AuditOutcome::Denied,
            ));
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_concurrent_appends_stay_line_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = std::sync::Arc::new(JsonlAuditSink::new(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = std::sync::Arc::clone(&sink);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        sink.record(AuditEntry::new(
                            "developer",
                            ResourceCategory::TechnicalTasks,
                            AccessAction::Write,
                            AuditOutcome::Allowed,
                        ));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 400);
        for line in content.lines() {
            assert!(serde_json::from_str::<AuditEntry>(line).is_ok());
        }
    }
}
