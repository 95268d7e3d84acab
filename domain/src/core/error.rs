//! Domain error types

use crate::access::level::{AccessAction, ResourceCategory};
use crate::decision::stage::CycleStage;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("registry must contain exactly {expected} agents, got {actual}")]
    WrongAgentCount { expected: usize, actual: usize },

    #[error("duplicate agent role in registry: {0}")]
    DuplicateRole(String),

    #[error("unknown agent role: {0}")]
    UnknownRole(String),

    #[error("access denied: {principal} may not {action} {category}")]
    AccessDenied {
        principal: String,
        action: AccessAction,
        category: ResourceCategory,
    },

    #[error("invalid cycle transition: {from} -> {to}")]
    InvalidTransition { from: CycleStage, to: CycleStage },

    #[error("agent {0} already voted on this proposal")]
    DuplicateVote(String),

    #[error("observed reputation value {0} is outside [0, 1]")]
    ObservedOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_display_names_the_blocked_element() {
        let error = DomainError::AccessDenied {
            principal: "marketing".to_string(),
            action: AccessAction::Write,
            category: ResourceCategory::Finances,
        };
        let message = error.to_string();
        assert!(message.contains("marketing"));
        assert!(message.contains("finances"));
    }

    #[test]
    fn test_transition_display() {
        let error = DomainError::InvalidTransition {
            from: CycleStage::Draft,
            to: CycleStage::Open,
        };
        assert_eq!(error.to_string(), "invalid cycle transition: draft -> open");
    }
}
