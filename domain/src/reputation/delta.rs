//! Observed performance deltas
//!
//! A delta records what was actually observed about one agent on one
//! dimension, after a decision's outcome is known. Deltas are append-only
//! ledger entries; the store folds them into scores via EMA.

use super::scores::ReputationDimension;
use crate::agent::role::AgentRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation about one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationDelta {
    pub agent: AgentRole,
    pub dimension: ReputationDimension,
    /// Observed value in [0, 1].
    pub observed: f64,
    pub timestamp: DateTime<Utc>,
}

impl ReputationDelta {
    pub fn new(agent: AgentRole, dimension: ReputationDimension, observed: f64) -> Self {
        Self {
            agent,
            dimension,
            observed,
            timestamp: Utc::now(),
        }
    }
}
