//! Failure patterns
//!
//! A pattern is the distilled signature of a project that failed: what it
//! looked like, why it failed, and the rule that would have prevented it.
//! Patterns are append-only; institutional memory never regresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad failure class, used as one axis of similarity matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Technical,
    Business,
    Communication,
    Planning,
    Execution,
    Resource,
    Market,
    Unknown,
}

impl FailureCategory {
    /// Indicator keywords for classifying free text into a category.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            FailureCategory::Technical => &["bug", "crash", "outage", "error", "technical"],
            FailureCategory::Business => &["loss", "unprofitable", "pricing", "churn"],
            FailureCategory::Communication => &["misunderstanding", "unclear", "conflict"],
            FailureCategory::Planning => &["underestimate", "schedule", "scope", "planning"],
            FailureCategory::Execution => &["delay", "quality", "rework", "execution"],
            FailureCategory::Resource => &["budget", "staffing", "capacity", "resource"],
            FailureCategory::Market => &["demand", "competitor", "timing", "audience"],
            FailureCategory::Unknown => &[],
        }
    }

    /// Classify free text by first category with a keyword hit.
    pub fn categorize(text: &str) -> FailureCategory {
        let lower = text.to_lowercase();
        [
            FailureCategory::Technical,
            FailureCategory::Business,
            FailureCategory::Communication,
            FailureCategory::Planning,
            FailureCategory::Execution,
            FailureCategory::Resource,
            FailureCategory::Market,
        ]
        .into_iter()
        .find(|category| category.keywords().iter().any(|k| lower.contains(k)))
        .unwrap_or(FailureCategory::Unknown)
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureCategory::Technical => "technical",
            FailureCategory::Business => "business",
            FailureCategory::Communication => "communication",
            FailureCategory::Planning => "planning",
            FailureCategory::Execution => "execution",
            FailureCategory::Resource => "resource",
            FailureCategory::Market => "market",
            FailureCategory::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// How badly the original failure hurt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for FailureSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureSeverity::Low => "low",
            FailureSeverity::Medium => "medium",
            FailureSeverity::High => "high",
            FailureSeverity::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// One catalogued failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailurePattern {
    pub id: String,
    /// Text descriptor of the failed proposal, matched against new ones.
    pub signature: String,
    pub root_cause: String,
    pub preventive_rule: String,
    pub category: FailureCategory,
    pub severity: FailureSeverity,
    pub recorded_at: DateTime<Utc>,
}

impl FailurePattern {
    pub fn new(
        id: impl Into<String>,
        signature: impl Into<String>,
        root_cause: impl Into<String>,
        preventive_rule: impl Into<String>,
    ) -> Self {
        let signature = signature.into();
        let category = FailureCategory::categorize(&signature);
        Self {
            id: id.into(),
            signature,
            root_cause: root_cause.into(),
            preventive_rule: preventive_rule.into(),
            category,
            severity: FailureSeverity::Medium,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_severity(mut self, severity: FailureSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_category(mut self, category: FailureCategory) -> Self {
        self.category = category;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_by_keyword() {
        assert_eq!(
            FailureCategory::categorize("the schedule slipped badly"),
            FailureCategory::Planning
        );
        assert_eq!(
            FailureCategory::categorize("a crash in production"),
            FailureCategory::Technical
        );
        assert_eq!(
            FailureCategory::categorize("nothing noteworthy"),
            FailureCategory::Unknown
        );
    }

    #[test]
    fn test_pattern_infers_category_from_signature() {
        let pattern = FailurePattern::new(
            "fp-001",
            "budget overrun on an oversized rewrite",
            "no cost ceiling agreed before start",
            "require a budget ceiling in every proposal",
        );
        assert_eq!(pattern.category, FailureCategory::Resource);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(FailureSeverity::Critical > FailureSeverity::High);
        assert!(FailureSeverity::Low < FailureSeverity::Medium);
    }
}
