//! Critic evaluations
//!
//! Voting may not open until the critic seat has produced an evaluation;
//! the timestamp proves the ordering against the tally.

use crate::agent::role::AgentRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The mandatory pre-vote evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    pub critic: AgentRole,
    pub proposal_id: String,
    pub summary: String,
    pub risks: Vec<String>,
    pub issued_at: DateTime<Utc>,
}

impl Critique {
    pub fn new(
        critic: AgentRole,
        proposal_id: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            critic,
            proposal_id: proposal_id.into(),
            summary: summary.into(),
            risks: Vec::new(),
            issued_at: Utc::now(),
        }
    }

    pub fn with_risks(mut self, risks: impl IntoIterator<Item = String>) -> Self {
        self.risks = risks.into_iter().collect();
        self
    }
}
