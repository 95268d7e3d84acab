//! Scripted reasoning gateway
//!
//! A deterministic, offline stand-in for the external reasoning
//! provider: each seat votes from a fixed professional stance keyed off
//! the proposal text. Useful for demos, dry runs, and driving the
//! engine without network access. The advisory seat always abstains —
//! it contributes context, not a vote.

use async_trait::async_trait;
use boardroom_application::{Ballot, CycleContext, GatewayError, ReasoningGateway};
use boardroom_domain::{AgentRole, Critique, Decision, Proposal};
use std::time::Duration;

/// Deterministic provider with optional simulated latency.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGateway {
    latency: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before every answer, to exercise timeout paths.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn red_flags(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    let mut flags = Vec::new();
    if lower.contains("rewrite") || lower.contains("unbounded") {
        flags.push("scope is open-ended");
    }
    if lower.contains("untested") || lower.contains("rushed") {
        flags.push("quality risk is unaddressed");
    }
    if lower.contains("expensive") || lower.contains("unbudgeted") {
        flags.push("no cost ceiling");
    }
    flags
}

fn stance(role: AgentRole, proposal: &Proposal) -> Ballot {
    let text = format!("{} {}", proposal.title, proposal.description);
    let flags = red_flags(&text);

    match role {
        AgentRole::Archivist => {
            Ballot::abstain("advisory seat: context provided, no vote cast")
        }
        AgentRole::Critic => {
            if flags.is_empty() {
                Ballot::approve("assumptions were challenged and held up")
            } else {
                Ballot::reject(format!("unresolved risks: {}", flags.join(", ")))
            }
        }
        AgentRole::Finance => {
            if flags.contains(&"no cost ceiling") {
                Ballot::reject("costs are not bounded; no defensible return estimate")
            } else {
                Ballot::approve("cost profile is acceptable and trackable")
            }
        }
        AgentRole::Qa => {
            if flags.contains(&"quality risk is unaddressed") {
                Ballot::reject("no test plan for the riskiest path")
            } else {
                Ballot::approve("testable in its current scope")
            }
        }
        AgentRole::Ceo => Ballot::approve("aligned with the long-term direction"),
        AgentRole::ProjectManager => {
            Ballot::approve("schedulable in clear phases with measurable milestones")
        }
        AgentRole::Cto => Ballot::approve("technically sound; scaling path exists"),
        AgentRole::Developer => Ballot::approve("a prototype can start immediately"),
        AgentRole::Marketing => Ballot::approve("there is an identifiable audience"),
        AgentRole::Chair => Ballot::approve("discussion heard from every seat"),
    }
}

#[async_trait]
impl ReasoningGateway for ScriptedGateway {
    async fn cast_vote(
        &self,
        agent: AgentRole,
        proposal: &Proposal,
        _context: &CycleContext,
    ) -> Result<Ballot, GatewayError> {
        self.simulate_latency().await;
        Ok(stance(agent, proposal))
    }

    async fn critique(
        &self,
        critic: AgentRole,
        proposal: &Proposal,
    ) -> Result<Critique, GatewayError> {
        self.simulate_latency().await;
        let text = format!("{} {}", proposal.title, proposal.description);
        let risks: Vec<String> = red_flags(&text).iter().map(|f| f.to_string()).collect();
        let summary = if risks.is_empty() {
            format!(
                "Reviewed \"{}\": assumptions are plausible and the downside is contained.",
                proposal.title
            )
        } else {
            format!(
                "Reviewed \"{}\": {} unresolved risk(s) need an owner before execution.",
                proposal.title,
                risks.len()
            )
        };
        Ok(Critique::new(critic, proposal.id.as_str(), summary).with_risks(risks))
    }

    async fn reflect(&self, agent: AgentRole, decision: &Decision) -> Result<String, GatewayError> {
        self.simulate_latency().await;
        let own_vote = decision
            .votes
            .get(&agent)
            .map(|vote| vote.value.to_string())
            .unwrap_or_else(|| "none".to_string());
        Ok(format!(
            "# Reflection — {}\n\nOutcome was {}. My vote: {}.\n\
             What worked: the stance matched my remit.\n\
             What to improve: surface concerns earlier in the discussion.\n",
            agent, decision.outcome, own_vote
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardroom_domain::VoteValue;

    fn proposal(description: &str) -> Proposal {
        Proposal::new("p-1", AgentRole::Ceo, "Tooling", description)
    }

    #[tokio::test]
    async fn test_votes_are_deterministic() {
        let gateway = ScriptedGateway::new();
        let proposal = proposal("a small internal dashboard");
        let context = CycleContext::default();

        let first = gateway
            .cast_vote(AgentRole::Cto, &proposal, &context)
            .await
            .unwrap();
        let second = gateway
            .cast_vote(AgentRole::Cto, &proposal, &context)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.value, VoteValue::Approve);
    }

    #[tokio::test]
    async fn test_advisory_seat_abstains() {
        let gateway = ScriptedGateway::new();
        let ballot = gateway
            .cast_vote(AgentRole::Archivist, &proposal("anything"), &CycleContext::default())
            .await
            .unwrap();
        assert_eq!(ballot.value, VoteValue::Abstain);
    }

    #[tokio::test]
    async fn test_critic_rejects_flagged_proposals() {
        let gateway = ScriptedGateway::new();
        let ballot = gateway
            .cast_vote(
                AgentRole::Critic,
                &proposal("a rushed full rewrite of the platform"),
                &CycleContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(ballot.value, VoteValue::Reject);
    }

    #[tokio::test]
    async fn test_critique_lists_risks() {
        let gateway = ScriptedGateway::new();
        let critique = gateway
            .critique(AgentRole::Critic, &proposal("an expensive untested rewrite"))
            .await
            .unwrap();
        assert_eq!(critique.risks.len(), 3);
        assert!(critique.summary.contains("unresolved risk"));
    }
}
