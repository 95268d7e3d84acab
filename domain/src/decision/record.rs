//! Binding decision records
//!
//! A decision is assembled fully in memory when a cycle closes and is
//! immutable from then on; the ledger appends it as one atomic unit.

use super::proposal::Proposal;
use super::tally::TallyResult;
use super::vote::Vote;
use crate::agent::role::AgentRole;
use crate::failure::library::PatternMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Terminal outcome of a decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approved,
    Rejected,
    /// Quorum was not met; the proposal may be resubmitted later.
    Deferred,
    /// Screened out before any vote was cast.
    Blocked,
}

impl DecisionOutcome {
    pub fn is_binding(&self) -> bool {
        matches!(self, DecisionOutcome::Approved | DecisionOutcome::Rejected)
    }
}

impl std::fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecisionOutcome::Approved => "approved",
            DecisionOutcome::Rejected => "rejected",
            DecisionOutcome::Deferred => "deferred",
            DecisionOutcome::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

/// The persisted record of one closed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub proposal: Proposal,
    pub votes: BTreeMap<AgentRole, Vote>,
    pub outcome: DecisionOutcome,
    pub quorum_met: bool,
    /// Normalized weighted score, absent for deferred and blocked cycles.
    pub score: Option<f64>,
    /// Human-readable reason for a deferred outcome.
    pub defer_reason: Option<String>,
    /// Patterns that blocked the proposal, returned to the author.
    pub blocked_by: Vec<PatternMatch>,
    pub closed_at: DateTime<Utc>,
    pub cost_estimate: Option<f64>,
    pub revenue_estimate: Option<f64>,
    pub action_items: Vec<String>,
}

impl Decision {
    /// Build the record for a cycle that went to a vote.
    pub fn from_tally(
        id: impl Into<String>,
        proposal: Proposal,
        votes: BTreeMap<AgentRole, Vote>,
        result: &TallyResult,
    ) -> Self {
        let defer_reason = (!result.quorum_met).then(|| "insufficient_participation".to_string());
        Self {
            id: id.into(),
            proposal,
            votes,
            outcome: result.outcome,
            quorum_met: result.quorum_met,
            score: result.score,
            defer_reason,
            blocked_by: Vec::new(),
            closed_at: Utc::now(),
            cost_estimate: None,
            revenue_estimate: None,
            action_items: Vec::new(),
        }
    }

    /// Build the record for a proposal screened out before voting.
    /// Carries no votes, by construction.
    pub fn blocked(id: impl Into<String>, proposal: Proposal, matches: Vec<PatternMatch>) -> Self {
        Self {
            id: id.into(),
            proposal,
            votes: BTreeMap::new(),
            outcome: DecisionOutcome::Blocked,
            quorum_met: false,
            score: None,
            defer_reason: None,
            blocked_by: matches,
            closed_at: Utc::now(),
            cost_estimate: None,
            revenue_estimate: None,
            action_items: Vec::new(),
        }
    }

    pub fn with_estimates(mut self, cost: Option<f64>, revenue: Option<f64>) -> Self {
        self.cost_estimate = cost;
        self.revenue_estimate = revenue;
        self
    }

    pub fn with_action_items(mut self, items: impl IntoIterator<Item = String>) -> Self {
        self.action_items = items.into_iter().collect();
        self
    }

    /// Roles that cast a counted vote in this decision.
    pub fn participants(&self) -> Vec<AgentRole> {
        self.votes
            .values()
            .filter(|vote| vote.value.is_counted() && !vote.agent.is_advisory())
            .map(|vote| vote.agent)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::tally::{QuorumPolicy, tally};
    use crate::decision::vote::VoteValue;

    fn proposal() -> Proposal {
        Proposal::new("p-1", AgentRole::Ceo, "Ship it", "a small well-scoped tool")
    }

    #[test]
    fn test_blocked_decision_has_zero_votes() {
        let decision = Decision::blocked(
            "d-1",
            proposal(),
            vec![PatternMatch {
                pattern_id: "fp-001".to_string(),
                similarity: 0.9,
                root_cause: "no demand validation".to_string(),
                preventive_rule: "validate first".to_string(),
            }],
        );

        assert_eq!(decision.outcome, DecisionOutcome::Blocked);
        assert!(decision.votes.is_empty());
        assert!(!decision.quorum_met);
        assert_eq!(decision.blocked_by.len(), 1);
    }

    #[test]
    fn test_deferred_decision_carries_reason() {
        let votes: BTreeMap<AgentRole, Vote> = [(
            AgentRole::Ceo,
            Vote::new(AgentRole::Ceo, "p-1", VoteValue::Approve, 1.5, "yes"),
        )]
        .into_iter()
        .collect();

        let result = tally(&votes, QuorumPolicy::default());
        let decision = Decision::from_tally("d-1", proposal(), votes, &result);

        assert_eq!(decision.outcome, DecisionOutcome::Deferred);
        assert_eq!(
            decision.defer_reason.as_deref(),
            Some("insufficient_participation")
        );
    }

    #[test]
    fn test_participants_excludes_abstainers_and_advisory() {
        let votes: BTreeMap<AgentRole, Vote> = [
            (
                AgentRole::Ceo,
                Vote::new(AgentRole::Ceo, "p-1", VoteValue::Approve, 1.5, "yes"),
            ),
            (
                AgentRole::Qa,
                Vote::new(AgentRole::Qa, "p-1", VoteValue::Abstain, 1.1, "unsure"),
            ),
            (
                AgentRole::Archivist,
                Vote::new(AgentRole::Archivist, "p-1", VoteValue::Approve, 0.0, "context"),
            ),
        ]
        .into_iter()
        .collect();

        let result = tally(&votes, QuorumPolicy::default());
        let decision = Decision::from_tally("d-1", proposal(), votes, &result);
        assert_eq!(decision.participants(), vec![AgentRole::Ceo]);
    }

    #[test]
    fn test_decision_serializes_round_trip() {
        let decision = Decision::blocked("d-1", proposal(), Vec::new());
        let json = serde_json::to_string(&decision).unwrap();
        let back: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decision);
    }
}
