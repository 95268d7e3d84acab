//! Decision ledger port
//!
//! The ledger is an ordered, append-only record of everything a cycle
//! commits: the decision, the reputation deltas that followed it, and
//! any new failure patterns. Replaying the records in order must
//! reconstruct reputation and failure-library state exactly.

use async_trait::async_trait;
use boardroom_domain::{Decision, FailurePattern, ReputationDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the persistence boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger corrupt: {0}")]
    Corrupt(String),
}

/// Everything one decision cycle persists, as a single atomic unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitBundle {
    pub cycle_id: String,
    pub decision: Decision,
    pub reputation_deltas: Vec<ReputationDelta>,
    pub new_patterns: Vec<FailurePattern>,
}

/// Post-hoc observations for an already-closed cycle: performance
/// deltas, plus any failure pattern the project's real-world outcome
/// earned itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBatch {
    pub cycle_id: String,
    pub deltas: Vec<ReputationDelta>,
    pub new_patterns: Vec<FailurePattern>,
}

/// One appended ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerRecord {
    Cycle(CommitBundle),
    OutcomeScores(OutcomeBatch),
}

impl LedgerRecord {
    pub fn cycle_id(&self) -> &str {
        match self {
            LedgerRecord::Cycle(bundle) => &bundle.cycle_id,
            LedgerRecord::OutcomeScores(batch) => &batch.cycle_id,
        }
    }
}

/// Durable, crash-consistent store behind the engine.
///
/// `commit` must be atomic per record: a reader (or a restart) sees the
/// whole record or nothing, never a torn write. Commits are serialized;
/// concurrent reads observe only committed state.
#[async_trait]
pub trait DecisionLedger: Send + Sync {
    async fn commit(&self, record: &LedgerRecord) -> Result<(), PersistenceError>;

    /// All committed records, oldest first.
    async fn restore(&self) -> Result<Vec<LedgerRecord>, PersistenceError>;
}
