//! The access rule table
//!
//! One level per (role, category) pair. Pairs without an explicit rule
//! resolve to `ReadOnly` — omission never escalates.

use super::level::{AccessLevel, ResourceCategory};
use crate::agent::role::AgentRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single (role, category, level) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub role: AgentRole,
    pub category: ResourceCategory,
    pub level: AccessLevel,
}

impl AccessRule {
    pub fn new(role: AgentRole, category: ResourceCategory, level: AccessLevel) -> Self {
        Self {
            role,
            category,
            level,
        }
    }
}

/// Lookup table from (role, category) to access level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessTable {
    rules: BTreeMap<AgentRole, BTreeMap<ResourceCategory, AccessLevel>>,
}

impl AccessTable {
    /// Build a table from explicit rules. Later rows win on duplicates.
    pub fn from_rules(rules: impl IntoIterator<Item = AccessRule>) -> Self {
        let mut table = AccessTable::default();
        for rule in rules {
            table.set_level(rule.role, rule.category, rule.level);
        }
        table
    }

    /// The default panel table.
    ///
    /// Each role administers its own professional domain, writes to
    /// shared meeting resources, and falls back to read-only everywhere
    /// else.
    pub fn bootstrap() -> Self {
        use AccessLevel::{Admin, ReadOnly, Write};
        use AgentRole::*;
        use ResourceCategory::*;

        Self::from_rules([
            AccessRule::new(Chair, Meetings, Admin),
            AccessRule::new(Chair, Decisions, Admin),
            AccessRule::new(Chair, Voting, Admin),
            AccessRule::new(Chair, Board, Write),
            AccessRule::new(Ceo, Meetings, Write),
            AccessRule::new(Ceo, Decisions, Write),
            AccessRule::new(Ceo, Ideas, Admin),
            AccessRule::new(Ceo, Board, Write),
            AccessRule::new(Cto, Meetings, Write),
            AccessRule::new(Cto, Decisions, Write),
            AccessRule::new(Cto, TechnicalTasks, Admin),
            AccessRule::new(Cto, Board, Write),
            AccessRule::new(Developer, Meetings, Write),
            AccessRule::new(Developer, TechnicalTasks, Admin),
            AccessRule::new(Developer, Board, Write),
            AccessRule::new(ProjectManager, Meetings, Write),
            AccessRule::new(ProjectManager, Decisions, Write),
            AccessRule::new(ProjectManager, Board, Admin),
            AccessRule::new(Finance, Meetings, Write),
            AccessRule::new(Finance, Finances, Admin),
            AccessRule::new(Marketing, Meetings, Write),
            AccessRule::new(Marketing, MarketAnalysis, Admin),
            AccessRule::new(Marketing, Board, ReadOnly),
            AccessRule::new(Qa, Meetings, Write),
            AccessRule::new(Qa, QualityReports, Admin),
            AccessRule::new(Critic, Meetings, Write),
            AccessRule::new(Critic, Evaluations, Admin),
            AccessRule::new(Archivist, MemorySystem, Admin),
            AccessRule::new(Archivist, Backups, Admin),
        ])
    }

    /// Level for a (role, category) pair. Missing entries are `ReadOnly`.
    pub fn level_for(&self, role: AgentRole, category: ResourceCategory) -> AccessLevel {
        self.rules
            .get(&role)
            .and_then(|by_category| by_category.get(&category))
            .copied()
            .unwrap_or(AccessLevel::ReadOnly)
    }

    pub fn set_level(&mut self, role: AgentRole, category: ResourceCategory, level: AccessLevel) {
        self.rules.entry(role).or_default().insert(category, level);
    }

    /// Categories where this role's configured level is exactly `Write`.
    /// Reputation-driven promotion and demotion act on these.
    pub fn write_categories(&self, role: AgentRole) -> Vec<ResourceCategory> {
        self.rules
            .get(&role)
            .map(|by_category| {
                by_category
                    .iter()
                    .filter(|(_, level)| **level == AccessLevel::Write)
                    .map(|(category, _)| *category)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Flatten back into rows, for persistence and display.
    pub fn rules(&self) -> Vec<AccessRule> {
        self.rules
            .iter()
            .flat_map(|(role, by_category)| {
                by_category
                    .iter()
                    .map(|(category, level)| AccessRule::new(*role, *category, *level))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_pair_defaults_to_read_only() {
        let table = AccessTable::bootstrap();
        // No explicit rule for marketing on finances.
        assert_eq!(
            table.level_for(AgentRole::Marketing, ResourceCategory::Finances),
            AccessLevel::ReadOnly
        );
    }

    #[test]
    fn test_no_pair_defaults_to_admin() {
        let table = AccessTable::bootstrap();
        for role in AgentRole::ALL {
            for category in ResourceCategory::ALL {
                let level = table.level_for(role, category);
                let explicit = table
                    .rules()
                    .iter()
                    .any(|r| r.role == role && r.category == category);
                if !explicit {
                    assert_eq!(level, AccessLevel::ReadOnly, "{role}/{category} escalated");
                }
            }
        }
    }

    #[test]
    fn test_later_rule_wins() {
        let table = AccessTable::from_rules([
            AccessRule::new(AgentRole::Qa, ResourceCategory::Board, AccessLevel::ReadOnly),
            AccessRule::new(AgentRole::Qa, ResourceCategory::Board, AccessLevel::Write),
        ]);
        assert_eq!(
            table.level_for(AgentRole::Qa, ResourceCategory::Board),
            AccessLevel::Write
        );
    }

    #[test]
    fn test_write_categories() {
        let table = AccessTable::bootstrap();
        let writable = table.write_categories(AgentRole::Ceo);
        assert!(writable.contains(&ResourceCategory::Meetings));
        assert!(writable.contains(&ResourceCategory::Board));
        // Admin-held categories are not write-tier.
        assert!(!writable.contains(&ResourceCategory::Ideas));
    }
}
