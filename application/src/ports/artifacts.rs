//! Artifact pipeline port
//!
//! Every cycle must leave a complete artifact trail behind: the
//! transcript, human-readable minutes, the decision record, one
//! self-reflection per participating agent, a global index entry, and a
//! task-board update. The pipeline writes them and checks for them; the
//! use case owns the retry-once policy.

use super::ledger::PersistenceError;
use async_trait::async_trait;
use boardroom_domain::{AgentRole, Decision};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One member of the mandatory artifact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Transcript,
    Minutes,
    Decisions,
    Reflection(AgentRole),
    IndexEntry,
    TaskBoard,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Transcript => write!(f, "transcript.jsonl"),
            ArtifactKind::Minutes => write!(f, "minutes.md"),
            ArtifactKind::Decisions => write!(f, "decisions.json"),
            ArtifactKind::Reflection(role) => write!(f, "reflections/{}.md", role),
            ArtifactKind::IndexEntry => write!(f, "index.json entry"),
            ArtifactKind::TaskBoard => write!(f, "board/tasks.json update"),
        }
    }
}

/// What a validation pass found.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub missing: Vec<ArtifactKind>,
}

impl ValidationReport {
    pub fn complete() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// One line of the machine-readable cycle transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TranscriptEntry {
    pub fn new(
        agent: impl Into<String>,
        message: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            agent: agent.into(),
            message: message.into(),
            kind: kind.into(),
        }
    }
}

/// Everything the pipeline needs to produce one cycle's artifact set.
#[derive(Debug, Clone)]
pub struct CycleArtifacts {
    pub cycle_id: String,
    pub transcript: Vec<TranscriptEntry>,
    pub minutes: String,
    pub decision: Decision,
    pub reflections: BTreeMap<AgentRole, String>,
}

/// Writes and verifies the mandatory artifact set.
#[async_trait]
pub trait ArtifactPipeline: Send + Sync {
    /// Produce the full artifact set for a cycle.
    async fn generate(&self, artifacts: &CycleArtifacts) -> Result<(), PersistenceError>;

    /// Check the artifact set. Idempotent: validating a complete set
    /// again reports complete and changes nothing.
    async fn validate(
        &self,
        cycle_id: &str,
        participants: &[AgentRole],
    ) -> Result<ValidationReport, PersistenceError>;

    /// Re-produce only the named missing artifacts.
    async fn regenerate(
        &self,
        artifacts: &CycleArtifacts,
        missing: &[ArtifactKind],
    ) -> Result<(), PersistenceError>;
}
