//! The reputation store
//!
//! Single owner of all mutable reputation state. Every mutation goes
//! through [`ReputationStore::apply_delta`] and bumps the store version,
//! so callers can detect staleness of any weight snapshot they hold.

use super::delta::ReputationDelta;
use super::scores::ReputationScores;
use crate::agent::registry::AgentRegistry;
use crate::agent::role::AgentRole;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Thresholds and streak length for role evolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolutionParams {
    /// Overall reputation above this counts toward promotion.
    pub promote_threshold: f64,
    /// Overall reputation below this counts toward demotion.
    pub demote_threshold: f64,
    /// Consecutive qualifying cycles required.
    pub streak: u32,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            promote_threshold: 0.8,
            demote_threshold: 0.3,
            streak: 3,
        }
    }
}

/// Direction of a role evolution event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionDirection {
    Promoted,
    Demoted,
}

/// An access-tier change earned through sustained performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEvolution {
    pub role: AgentRole,
    pub direction: EvolutionDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
struct Streaks {
    high: u32,
    low: u32,
}

/// Versioned, per-role reputation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationStore {
    scores: BTreeMap<AgentRole, ReputationScores>,
    streaks: BTreeMap<AgentRole, Streaks>,
    version: u64,
}

impl ReputationStore {
    /// Neutral scores for every agent in the registry.
    pub fn from_registry(registry: &AgentRegistry) -> Self {
        Self {
            scores: registry
                .iter()
                .map(|agent| (agent.role, agent.reputation))
                .collect(),
            streaks: BTreeMap::new(),
            version: 0,
        }
    }

    /// Fold one observation into the agent's scores.
    pub fn apply_delta(&mut self, delta: &ReputationDelta, alpha: f64) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&delta.observed) {
            return Err(DomainError::ObservedOutOfRange(delta.observed));
        }
        let scores = self
            .scores
            .get_mut(&delta.agent)
            .ok_or_else(|| DomainError::UnknownRole(delta.agent.to_string()))?;

        scores.apply_ema(delta.dimension, delta.observed, alpha);
        self.version += 1;
        Ok(())
    }

    pub fn scores(&self, role: AgentRole) -> Option<&ReputationScores> {
        self.scores.get(&role)
    }

    pub fn overall(&self, role: AgentRole) -> f64 {
        self.scores.get(&role).map(|s| s.overall()).unwrap_or(0.5)
    }

    /// Current voting weight: base weight scaled by reputation.
    ///
    /// The multiplier `0.5 + overall` spans [0.5, 1.5] for overall in
    /// [0, 1]; the clamp guards accumulated float drift. The advisory
    /// role is pinned to zero regardless of reputation.
    pub fn voting_weight(&self, role: AgentRole) -> f64 {
        if role.is_advisory() {
            return 0.0;
        }
        let multiplier = (0.5 + self.overall(role)).clamp(0.5, 1.5);
        role.base_weight() * multiplier
    }

    /// Weights for every tracked role at this instant.
    ///
    /// Votes snapshot from this map; the snapshot stays valid for the
    /// whole voting window even if deltas land meanwhile.
    pub fn snapshot_weights(&self) -> BTreeMap<AgentRole, f64> {
        self.scores
            .keys()
            .map(|role| (*role, self.voting_weight(*role)))
            .collect()
    }

    /// Close one evaluation cycle: advance streaks and emit any earned
    /// promotions or demotions. A cycle that qualifies for neither
    /// resets both streaks.
    pub fn evaluate_cycle(&mut self, params: EvolutionParams) -> Vec<RoleEvolution> {
        let mut evolutions = Vec::new();

        for role in self.scores.keys().copied().collect::<Vec<_>>() {
            let overall = self.overall(role);
            let streaks = self.streaks.entry(role).or_default();

            if overall > params.promote_threshold {
                streaks.high += 1;
                streaks.low = 0;
            } else if overall < params.demote_threshold {
                streaks.low += 1;
                streaks.high = 0;
            } else {
                *streaks = Streaks::default();
            }

            if streaks.high >= params.streak {
                streaks.high = 0;
                evolutions.push(RoleEvolution {
                    role,
                    direction: EvolutionDirection::Promoted,
                });
            } else if streaks.low >= params.streak {
                streaks.low = 0;
                evolutions.push(RoleEvolution {
                    role,
                    direction: EvolutionDirection::Demoted,
                });
            }
        }

        if !evolutions.is_empty() {
            self.version += 1;
        }
        evolutions
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn roles(&self) -> impl Iterator<Item = AgentRole> + '_ {
        self.scores.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reputation::scores::ReputationDimension;

    fn store() -> ReputationStore {
        ReputationStore::from_registry(&AgentRegistry::bootstrap())
    }

    fn delta(role: AgentRole, dimension: ReputationDimension, observed: f64) -> ReputationDelta {
        ReputationDelta::new(role, dimension, observed)
    }

    #[test]
    fn test_apply_delta_bumps_version() {
        let mut store = store();
        assert_eq!(store.version(), 0);
        store
            .apply_delta(&delta(AgentRole::Ceo, ReputationDimension::Accuracy, 0.9), 0.2)
            .unwrap();
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_out_of_range_observation_rejected() {
        let mut store = store();
        let result =
            store.apply_delta(&delta(AgentRole::Ceo, ReputationDimension::Accuracy, 1.2), 0.2);
        assert!(matches!(result, Err(DomainError::ObservedOutOfRange(_))));
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_neutral_weight_equals_base() {
        let store = store();
        // overall 0.5 -> multiplier 1.0
        assert!((store.voting_weight(AgentRole::Ceo) - 1.5).abs() < 1e-9);
        assert!((store.voting_weight(AgentRole::Chair) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_advisory_weight_is_always_zero() {
        let mut store = store();
        for _ in 0..20 {
            store
                .apply_delta(
                    &delta(AgentRole::Archivist, ReputationDimension::Accuracy, 1.0),
                    0.5,
                )
                .unwrap();
        }
        assert_eq!(store.voting_weight(AgentRole::Archivist), 0.0);
    }

    #[test]
    fn test_weight_scales_with_reputation() {
        let mut store = store();
        for dimension in ReputationDimension::ALL {
            for _ in 0..60 {
                store
                    .apply_delta(&delta(AgentRole::Chair, dimension, 1.0), 0.2)
                    .unwrap();
            }
        }
        // overall near 1.0 -> multiplier near 1.5
        assert!(store.voting_weight(AgentRole::Chair) > 1.49);
    }

    fn drive_overall(store: &mut ReputationStore, role: AgentRole, observed: f64) {
        for dimension in ReputationDimension::ALL {
            for _ in 0..60 {
                store.apply_delta(&delta(role, dimension, observed), 0.5).unwrap();
            }
        }
    }

    #[test]
    fn test_promotion_after_streak() {
        let mut store = store();
        drive_overall(&mut store, AgentRole::Developer, 1.0);

        let params = EvolutionParams::default();
        assert!(store.evaluate_cycle(params).is_empty());
        assert!(store.evaluate_cycle(params).is_empty());
        let third = store.evaluate_cycle(params);

        assert!(third.contains(&RoleEvolution {
            role: AgentRole::Developer,
            direction: EvolutionDirection::Promoted,
        }));
    }

    #[test]
    fn test_streak_resets_on_middling_cycle() {
        let mut store = store();
        drive_overall(&mut store, AgentRole::Developer, 1.0);

        let params = EvolutionParams::default();
        store.evaluate_cycle(params);
        store.evaluate_cycle(params);

        // Drop back to the middle band before the third qualifying cycle.
        drive_overall(&mut store, AgentRole::Developer, 0.5);
        assert!(store.evaluate_cycle(params).is_empty());
        // Climb again: the old partial streak must not count.
        drive_overall(&mut store, AgentRole::Developer, 1.0);
        assert!(store.evaluate_cycle(params).is_empty());
    }

    #[test]
    fn test_demotion_after_streak() {
        let mut store = store();
        drive_overall(&mut store, AgentRole::Marketing, 0.0);

        let params = EvolutionParams::default();
        store.evaluate_cycle(params);
        store.evaluate_cycle(params);
        let third = store.evaluate_cycle(params);

        assert!(third.contains(&RoleEvolution {
            role: AgentRole::Marketing,
            direction: EvolutionDirection::Demoted,
        }));
    }

    #[test]
    fn test_snapshot_is_stable_against_later_deltas() {
        let mut store = store();
        let snapshot = store.snapshot_weights();
        let before = snapshot[&AgentRole::Qa];

        store
            .apply_delta(&delta(AgentRole::Qa, ReputationDimension::Speed, 1.0), 0.5)
            .unwrap();

        assert_eq!(snapshot[&AgentRole::Qa], before);
        assert!(store.voting_weight(AgentRole::Qa) > before);
    }
}
