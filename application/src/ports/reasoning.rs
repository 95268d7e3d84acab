//! Reasoning provider port
//!
//! The provider that turns an agent's role and a proposal into a vote or
//! a critique is opaque, possibly slow, and possibly failing. The engine
//! owns every timeout and retry decision; implementations should simply
//! do the call and report what happened.

use async_trait::async_trait;
use boardroom_domain::{AgentRole, Critique, Decision, Proposal, VoteValue};
use thiserror::Error;

/// Errors from the reasoning provider boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("provider timed out")]
    Timeout,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// An agent's answer to a vote request.
#[derive(Debug, Clone, PartialEq)]
pub struct Ballot {
    pub value: VoteValue,
    pub rationale: String,
}

impl Ballot {
    pub fn new(value: VoteValue, rationale: impl Into<String>) -> Self {
        Self {
            value,
            rationale: rationale.into(),
        }
    }

    pub fn approve(rationale: impl Into<String>) -> Self {
        Self::new(VoteValue::Approve, rationale)
    }

    pub fn reject(rationale: impl Into<String>) -> Self {
        Self::new(VoteValue::Reject, rationale)
    }

    pub fn abstain(rationale: impl Into<String>) -> Self {
        Self::new(VoteValue::Abstain, rationale)
    }
}

/// Context handed to the provider alongside a vote request.
#[derive(Debug, Clone, Default)]
pub struct CycleContext {
    pub cycle_id: String,
    /// Relevant notes pulled from institutional memory.
    pub memory_notes: Vec<String>,
}

/// Outbound boundary to the reasoning provider.
#[async_trait]
pub trait ReasoningGateway: Send + Sync {
    /// Ask one agent for its stance on a proposal.
    async fn cast_vote(
        &self,
        agent: AgentRole,
        proposal: &Proposal,
        context: &CycleContext,
    ) -> Result<Ballot, GatewayError>;

    /// Ask the critic seat for the mandatory pre-vote evaluation.
    async fn critique(
        &self,
        critic: AgentRole,
        proposal: &Proposal,
    ) -> Result<Critique, GatewayError>;

    /// Ask one agent for its post-cycle self-reflection.
    async fn reflect(&self, agent: AgentRole, decision: &Decision) -> Result<String, GatewayError>;
}
