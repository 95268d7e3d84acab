//! Quorum check and weighted tally
//!
//! Quorum runs first: without seven non-abstaining voters the outcome is
//! deferred and no tally is computed at all. Advisory votes never count
//! toward quorum and carry zero weight in the tally.

use super::record::DecisionOutcome;
use super::vote::Vote;
use crate::agent::role::AgentRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Participation floor for a binding outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumPolicy {
    /// Minimum distinct non-abstaining voters.
    pub min_participants: usize,
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        Self { min_participants: 7 }
    }
}

/// Outcome of closing a voting window.
#[derive(Debug, Clone, PartialEq)]
pub struct TallyResult {
    pub outcome: DecisionOutcome,
    pub quorum_met: bool,
    /// Normalized weighted score in [-1, 1]; `None` when quorum failed
    /// and no tally was computed.
    pub score: Option<f64>,
    /// Count of non-abstaining, non-advisory voters.
    pub participants: usize,
}

/// Close a vote: quorum first, weighted score second.
///
/// Score is `sum(value * weight) / sum(weight)` over the counted votes.
/// Positive approves, negative rejects, and an exact zero rejects —
/// a tie is not a mandate.
pub fn tally(votes: &BTreeMap<AgentRole, Vote>, policy: QuorumPolicy) -> TallyResult {
    let counted: Vec<&Vote> = votes
        .values()
        .filter(|vote| vote.value.is_counted() && !vote.agent.is_advisory())
        .collect();

    let participants = counted.len();
    if participants < policy.min_participants {
        return TallyResult {
            outcome: DecisionOutcome::Deferred,
            quorum_met: false,
            score: None,
            participants,
        };
    }

    let weight_sum: f64 = counted.iter().map(|vote| vote.weight_at_cast).sum();
    let weighted: f64 = counted
        .iter()
        .map(|vote| vote.value.numeric() * vote.weight_at_cast)
        .sum();
    let score = if weight_sum > 0.0 {
        weighted / weight_sum
    } else {
        0.0
    };

    let outcome = if score > 0.0 {
        DecisionOutcome::Approved
    } else {
        DecisionOutcome::Rejected
    };

    TallyResult {
        outcome,
        quorum_met: true,
        score: Some(score),
        participants,
    }
}
