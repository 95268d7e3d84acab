//! Agent roles
//!
//! The panel is a closed set of ten roles. Roles are identity: there is
//! exactly one agent per role, and per-role rules (base voting weight,
//! advisory status, critic duty) hang off this enum rather than off
//! per-role subtypes.

use serde::{Deserialize, Serialize};

/// One of the ten fixed panel roles.
///
/// # Example
///
/// ```
/// use boardroom_domain::AgentRole;
///
/// let role: AgentRole = "cto".parse().unwrap();
/// assert_eq!(role, AgentRole::Cto);
/// assert_eq!(role.base_weight(), 1.3);
/// assert!(!role.is_advisory());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Ceo,
    ProjectManager,
    Cto,
    Developer,
    Qa,
    Marketing,
    Finance,
    Critic,
    Chair,
    /// Advisory-only institutional memory. Never votes, never counts
    /// toward quorum, still reputation-tracked.
    Archivist,
}

impl AgentRole {
    /// All ten roles, in canonical order.
    pub const ALL: [AgentRole; 10] = [
        AgentRole::Ceo,
        AgentRole::ProjectManager,
        AgentRole::Cto,
        AgentRole::Developer,
        AgentRole::Qa,
        AgentRole::Marketing,
        AgentRole::Finance,
        AgentRole::Critic,
        AgentRole::Chair,
        AgentRole::Archivist,
    ];

    /// Baseline voting weight before reputation scaling.
    pub fn base_weight(&self) -> f64 {
        match self {
            AgentRole::Ceo => 1.5,
            AgentRole::ProjectManager => 1.3,
            AgentRole::Cto => 1.3,
            AgentRole::Developer => 1.2,
            AgentRole::Qa => 1.1,
            AgentRole::Marketing => 1.0,
            AgentRole::Finance => 1.2,
            AgentRole::Critic => 1.1,
            AgentRole::Chair => 1.0,
            AgentRole::Archivist => 0.0,
        }
    }

    /// Whether this role participates in votes and quorum.
    pub fn is_advisory(&self) -> bool {
        matches!(self, AgentRole::Archivist)
    }

    /// The role that must produce the pre-vote evaluation.
    pub fn is_critic(&self) -> bool {
        matches!(self, AgentRole::Critic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Ceo => "ceo",
            AgentRole::ProjectManager => "pm",
            AgentRole::Cto => "cto",
            AgentRole::Developer => "developer",
            AgentRole::Qa => "qa",
            AgentRole::Marketing => "marketing",
            AgentRole::Finance => "finance",
            AgentRole::Critic => "critic",
            AgentRole::Chair => "chair",
            AgentRole::Archivist => "archivist",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ceo" => Ok(AgentRole::Ceo),
            "pm" | "project_manager" => Ok(AgentRole::ProjectManager),
            "cto" => Ok(AgentRole::Cto),
            "developer" | "dev" => Ok(AgentRole::Developer),
            "qa" => Ok(AgentRole::Qa),
            "marketing" => Ok(AgentRole::Marketing),
            "finance" => Ok(AgentRole::Finance),
            "critic" => Ok(AgentRole::Critic),
            "chair" => Ok(AgentRole::Chair),
            "archivist" | "memory" => Ok(AgentRole::Archivist),
            other => Err(format!("unknown agent role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_exactly_ten_distinct_roles() {
        let unique: BTreeSet<_> = AgentRole::ALL.iter().collect();
        assert_eq!(AgentRole::ALL.len(), 10);
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_only_archivist_is_advisory() {
        let advisory: Vec<_> = AgentRole::ALL.iter().filter(|r| r.is_advisory()).collect();
        assert_eq!(advisory, vec![&AgentRole::Archivist]);
    }

    #[test]
    fn test_advisory_role_has_zero_weight() {
        assert_eq!(AgentRole::Archivist.base_weight(), 0.0);
    }

    #[test]
    fn test_voting_roles_have_positive_weight() {
        for role in AgentRole::ALL.iter().filter(|r| !r.is_advisory()) {
            assert!(role.base_weight() > 0.0, "{} should carry weight", role);
        }
    }

    #[test]
    fn test_round_trip_parse() {
        for role in AgentRole::ALL {
            let parsed: AgentRole = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("project_manager".parse::<AgentRole>().unwrap(), AgentRole::ProjectManager);
        assert_eq!("memory".parse::<AgentRole>().unwrap(), AgentRole::Archivist);
        assert!("intern".parse::<AgentRole>().is_err());
    }
}
