//! Access levels, actions, and resource categories
//!
//! Levels are strictly ordered `ReadOnly < Write < Admin < System`; the
//! derive on the enum relies on variant order, so keep it.

use serde::{Deserialize, Serialize};

/// Ordered permission tier for a role on a resource category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    ReadOnly,
    Write,
    Admin,
    System,
}

impl AccessLevel {
    /// One tier up, capped at `Admin`. `System` is never granted by
    /// promotion; it belongs to the engine itself.
    pub fn promoted(self) -> AccessLevel {
        match self {
            AccessLevel::ReadOnly => AccessLevel::Write,
            AccessLevel::Write => AccessLevel::Admin,
            AccessLevel::Admin => AccessLevel::Admin,
            AccessLevel::System => AccessLevel::System,
        }
    }

    /// One tier down, floored at `ReadOnly`.
    pub fn demoted(self) -> AccessLevel {
        match self {
            AccessLevel::ReadOnly => AccessLevel::ReadOnly,
            AccessLevel::Write => AccessLevel::ReadOnly,
            AccessLevel::Admin => AccessLevel::Write,
            AccessLevel::System => AccessLevel::Admin,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::ReadOnly => "read_only",
            AccessLevel::Write => "write",
            AccessLevel::Admin => "admin",
            AccessLevel::System => "system",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "read_only" | "readonly" | "read" => Ok(AccessLevel::ReadOnly),
            "write" => Ok(AccessLevel::Write),
            "admin" => Ok(AccessLevel::Admin),
            "system" => Ok(AccessLevel::System),
            other => Err(format!("unknown access level: {}", other)),
        }
    }
}

/// What a principal is trying to do to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    Read,
    Write,
    Administer,
}

impl AccessAction {
    /// Minimum level required to perform this action.
    pub fn required_level(&self) -> AccessLevel {
        match self {
            AccessAction::Read => AccessLevel::ReadOnly,
            AccessAction::Write => AccessLevel::Write,
            AccessAction::Administer => AccessLevel::Admin,
        }
    }
}

impl std::fmt::Display for AccessAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AccessAction::Read => "read",
            AccessAction::Write => "write",
            AccessAction::Administer => "administer",
        };
        write!(f, "{}", s)
    }
}

/// Resource categories the access table governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Meetings,
    Decisions,
    Voting,
    Board,
    Ideas,
    TechnicalTasks,
    Finances,
    MarketAnalysis,
    QualityReports,
    Evaluations,
    MemorySystem,
    Backups,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 12] = [
        ResourceCategory::Meetings,
        ResourceCategory::Decisions,
        ResourceCategory::Voting,
        ResourceCategory::Board,
        ResourceCategory::Ideas,
        ResourceCategory::TechnicalTasks,
        ResourceCategory::Finances,
        ResourceCategory::MarketAnalysis,
        ResourceCategory::QualityReports,
        ResourceCategory::Evaluations,
        ResourceCategory::MemorySystem,
        ResourceCategory::Backups,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Meetings => "meetings",
            ResourceCategory::Decisions => "decisions",
            ResourceCategory::Voting => "voting",
            ResourceCategory::Board => "board",
            ResourceCategory::Ideas => "ideas",
            ResourceCategory::TechnicalTasks => "technical_tasks",
            ResourceCategory::Finances => "finances",
            ResourceCategory::MarketAnalysis => "market_analysis",
            ResourceCategory::QualityReports => "quality_reports",
            ResourceCategory::Evaluations => "evaluations",
            ResourceCategory::MemorySystem => "memory_system",
            ResourceCategory::Backups => "backups",
        }
    }
}

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResourceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceCategory::ALL
            .iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .copied()
            .ok_or_else(|| format!("unknown resource category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_strictly_ordered() {
        assert!(AccessLevel::ReadOnly < AccessLevel::Write);
        assert!(AccessLevel::Write < AccessLevel::Admin);
        assert!(AccessLevel::Admin < AccessLevel::System);
    }

    #[test]
    fn test_promotion_caps_at_admin() {
        assert_eq!(AccessLevel::Write.promoted(), AccessLevel::Admin);
        assert_eq!(AccessLevel::Admin.promoted(), AccessLevel::Admin);
    }

    #[test]
    fn test_demotion_floors_at_read_only() {
        assert_eq!(AccessLevel::Write.demoted(), AccessLevel::ReadOnly);
        assert_eq!(AccessLevel::ReadOnly.demoted(), AccessLevel::ReadOnly);
    }

    #[test]
    fn test_action_requirements() {
        assert_eq!(AccessAction::Read.required_level(), AccessLevel::ReadOnly);
        assert_eq!(AccessAction::Write.required_level(), AccessLevel::Write);
        assert_eq!(AccessAction::Administer.required_level(), AccessLevel::Admin);
    }

    #[test]
    fn test_category_round_trip() {
        for category in ResourceCategory::ALL {
            let parsed: ResourceCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }
}
