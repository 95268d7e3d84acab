//! The decision-cycle state machine
//!
//! `Draft -> CriticReviewed -> Open -> Closed`, with `Blocked` as the
//! alternate terminal reached straight from `Draft` by failure
//! screening. Every other transition is illegal; in particular a
//! proposal can never skip the critic.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Where a proposal currently sits in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStage {
    Draft,
    CriticReviewed,
    Open,
    Closed,
    Blocked,
}

impl CycleStage {
    /// Whether the machine allows moving to `next` from here.
    pub fn can_advance(&self, next: CycleStage) -> bool {
        matches!(
            (self, next),
            (CycleStage::Draft, CycleStage::CriticReviewed)
                | (CycleStage::Draft, CycleStage::Blocked)
                | (CycleStage::CriticReviewed, CycleStage::Open)
                | (CycleStage::Open, CycleStage::Closed)
        )
    }

    /// Advance, or report the illegal transition.
    pub fn advance(self, next: CycleStage) -> Result<CycleStage, DomainError> {
        if self.can_advance(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleStage::Closed | CycleStage::Blocked)
    }
}

impl std::fmt::Display for CycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CycleStage::Draft => "draft",
            CycleStage::CriticReviewed => "critic_reviewed",
            CycleStage::Open => "open",
            CycleStage::Closed => "closed",
            CycleStage::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let stage = CycleStage::Draft
            .advance(CycleStage::CriticReviewed)
            .and_then(|s| s.advance(CycleStage::Open))
            .and_then(|s| s.advance(CycleStage::Closed))
            .unwrap();
        assert_eq!(stage, CycleStage::Closed);
        assert!(stage.is_terminal());
    }

    #[test]
    fn test_cannot_skip_critic() {
        let result = CycleStage::Draft.advance(CycleStage::Open);
        assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
    }

    #[test]
    fn test_blocked_only_from_draft() {
        assert!(CycleStage::Draft.can_advance(CycleStage::Blocked));
        assert!(!CycleStage::CriticReviewed.can_advance(CycleStage::Blocked));
        assert!(!CycleStage::Open.can_advance(CycleStage::Blocked));
    }

    #[test]
    fn test_terminals_are_final() {
        for next in [
            CycleStage::Draft,
            CycleStage::CriticReviewed,
            CycleStage::Open,
            CycleStage::Closed,
            CycleStage::Blocked,
        ] {
            assert!(!CycleStage::Closed.can_advance(next));
            assert!(!CycleStage::Blocked.can_advance(next));
        }
    }
}
