//! Vote types
//!
//! A vote carries the weight the agent held at the moment it was cast.
//! The snapshot is deliberate: reputation may move while a window is
//! open, but a recorded vote never changes value retroactively.

use crate::agent::role::AgentRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The stance an agent takes on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteValue {
    Approve,
    Reject,
    Abstain,
}

impl VoteValue {
    /// Tally contribution: approve +1, reject -1, abstain 0.
    pub fn numeric(&self) -> f64 {
        match self {
            VoteValue::Approve => 1.0,
            VoteValue::Reject => -1.0,
            VoteValue::Abstain => 0.0,
        }
    }

    /// Whether this vote counts toward quorum.
    pub fn is_counted(&self) -> bool {
        !matches!(self, VoteValue::Abstain)
    }
}

impl std::fmt::Display for VoteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VoteValue::Approve => "approve",
            VoteValue::Reject => "reject",
            VoteValue::Abstain => "abstain",
        };
        write!(f, "{}", s)
    }
}

/// A single cast vote.
///
/// # Example
///
/// ```
/// use boardroom_domain::{AgentRole, Vote, VoteValue};
///
/// let vote = Vote::approve(AgentRole::Cto, "p-1", 1.3, "architecture is sound");
/// assert_eq!(vote.value, VoteValue::Approve);
/// assert_eq!(vote.weight_at_cast, 1.3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub agent: AgentRole,
    pub proposal_id: String,
    pub value: VoteValue,
    /// Reputation-scaled weight at the moment of casting. Snapshot, not
    /// live-recomputed.
    pub weight_at_cast: f64,
    pub rationale: String,
    pub cast_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(
        agent: AgentRole,
        proposal_id: impl Into<String>,
        value: VoteValue,
        weight_at_cast: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            agent,
            proposal_id: proposal_id.into(),
            value,
            weight_at_cast,
            rationale: rationale.into(),
            cast_at: Utc::now(),
        }
    }

    pub fn approve(
        agent: AgentRole,
        proposal_id: impl Into<String>,
        weight: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self::new(agent, proposal_id, VoteValue::Approve, weight, rationale)
    }

    pub fn reject(
        agent: AgentRole,
        proposal_id: impl Into<String>,
        weight: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self::new(agent, proposal_id, VoteValue::Reject, weight, rationale)
    }

    pub fn abstain(
        agent: AgentRole,
        proposal_id: impl Into<String>,
        weight: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self::new(agent, proposal_id, VoteValue::Abstain, weight, rationale)
    }
}
