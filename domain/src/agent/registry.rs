//! The agent registry
//!
//! An immutable catalog of exactly ten agents, one per role, created once
//! at startup. Reputation lives in the [`ReputationStore`]; the registry
//! carries only each agent's initial state.
//!
//! [`ReputationStore`]: crate::reputation::store::ReputationStore

use super::role::AgentRole;
use crate::access::level::{AccessLevel, ResourceCategory};
use crate::access::table::AccessTable;
use crate::core::error::DomainError;
use crate::reputation::scores::ReputationScores;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One panel member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub role: AgentRole,
    pub base_weight: f64,
    /// Initial dimension scores; live state belongs to the store.
    pub reputation: ReputationScores,
    /// Initial per-category levels, taken from the access table.
    pub access_profile: BTreeMap<ResourceCategory, AccessLevel>,
}

impl Agent {
    /// Default agent for a role, profiled from the given table.
    pub fn for_role(role: AgentRole, table: &AccessTable) -> Self {
        let access_profile = ResourceCategory::ALL
            .iter()
            .map(|category| (*category, table.level_for(role, *category)))
            .collect();

        Self {
            role,
            base_weight: role.base_weight(),
            reputation: ReputationScores::default(),
            access_profile,
        }
    }
}

/// Immutable ten-agent catalog.
///
/// # Example
///
/// ```
/// use boardroom_domain::AgentRegistry;
///
/// let registry = AgentRegistry::bootstrap();
/// assert_eq!(registry.len(), 10);
/// assert_eq!(registry.voting_roles().count(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentRole, Agent>,
}

impl AgentRegistry {
    /// The full panel with default profiles.
    pub fn bootstrap() -> Self {
        let table = AccessTable::bootstrap();
        let agents = AgentRole::ALL
            .iter()
            .map(|role| (*role, Agent::for_role(*role, &table)))
            .collect();
        Self { agents }
    }

    /// Build from explicit agents, enforcing the panel invariants:
    /// exactly ten agents with pairwise-distinct roles.
    pub fn from_agents(agents: Vec<Agent>) -> Result<Self, DomainError> {
        let mut map = BTreeMap::new();
        for agent in agents {
            let role = agent.role;
            if map.insert(role, agent).is_some() {
                return Err(DomainError::DuplicateRole(role.to_string()));
            }
        }
        if map.len() != AgentRole::ALL.len() {
            return Err(DomainError::WrongAgentCount {
                expected: AgentRole::ALL.len(),
                actual: map.len(),
            });
        }
        Ok(Self { agents: map })
    }

    pub fn get(&self, role: AgentRole) -> Option<&Agent> {
        self.agents.get(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Roles that cast counted votes (everyone but the advisory seat).
    pub fn voting_roles(&self) -> impl Iterator<Item = AgentRole> + '_ {
        self.agents.keys().copied().filter(|role| !role.is_advisory())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_has_exactly_ten_distinct_agents() {
        let registry = AgentRegistry::bootstrap();
        assert_eq!(registry.len(), 10);
        for role in AgentRole::ALL {
            assert!(registry.get(role).is_some(), "missing {}", role);
        }
    }

    #[test]
    fn test_from_agents_rejects_short_panel() {
        let table = AccessTable::bootstrap();
        let nine: Vec<Agent> = AgentRole::ALL[..9]
            .iter()
            .map(|role| Agent::for_role(*role, &table))
            .collect();

        let result = AgentRegistry::from_agents(nine);
        assert!(matches!(
            result,
            Err(DomainError::WrongAgentCount { expected: 10, actual: 9 })
        ));
    }

    #[test]
    fn test_from_agents_rejects_duplicate_role() {
        let table = AccessTable::bootstrap();
        let mut agents: Vec<Agent> = AgentRole::ALL
            .iter()
            .map(|role| Agent::for_role(*role, &table))
            .collect();
        agents[9] = Agent::for_role(AgentRole::Ceo, &table);

        let result = AgentRegistry::from_agents(agents);
        assert!(matches!(result, Err(DomainError::DuplicateRole(_))));
    }

    #[test]
    fn test_agent_profile_mirrors_table() {
        let registry = AgentRegistry::bootstrap();
        let chair = registry.get(AgentRole::Chair).unwrap();
        assert_eq!(
            chair.access_profile[&ResourceCategory::Meetings],
            AccessLevel::Admin
        );
        assert_eq!(
            chair.access_profile[&ResourceCategory::Finances],
            AccessLevel::ReadOnly
        );
    }

    #[test]
    fn test_base_weights_follow_roles() {
        let registry = AgentRegistry::bootstrap();
        for agent in registry.iter() {
            assert_eq!(agent.base_weight, agent.role.base_weight());
        }
    }
}
