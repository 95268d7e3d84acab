//! Behavioral configuration
//!
//! Every governance policy knob lives here: the screening threshold,
//! the EMA smoothing factor, vote timing, role evolution thresholds,
//! and persistence retry bounds. Defaults are conservative;
//! infrastructure config can override any of them.

use boardroom_domain::{EvolutionParams, QuorumPolicy};
use std::time::Duration;

/// Tunable engine policy.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// Similarity at or above which screening blocks a proposal.
    pub screening_threshold: f64,
    /// EMA smoothing factor for reputation deltas.
    pub ema_alpha: f64,
    pub quorum: QuorumPolicy,
    /// Timeout for each individual provider call.
    pub vote_timeout: Duration,
    /// Shared deadline for the whole voting window.
    pub vote_deadline: Duration,
    pub evolution: EvolutionParams,
    /// Ledger commit attempts before the cycle aborts.
    pub persist_attempts: u32,
    /// Initial backoff between commit attempts; doubles each retry.
    pub persist_backoff: Duration,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            screening_threshold: 0.75,
            ema_alpha: 0.2,
            quorum: QuorumPolicy::default(),
            vote_timeout: Duration::from_secs(30),
            vote_deadline: Duration::from_secs(120),
            evolution: EvolutionParams::default(),
            persist_attempts: 3,
            persist_backoff: Duration::from_millis(250),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_design_policy() {
        let config = BehaviorConfig::default();
        assert_eq!(config.screening_threshold, 0.75);
        assert_eq!(config.ema_alpha, 0.2);
        assert_eq!(config.quorum.min_participants, 7);
        assert_eq!(config.evolution.streak, 3);
        assert_eq!(config.persist_attempts, 3);
    }
}
