//! Per-agent performance dimensions
//!
//! Five dimensions in [0, 1], smoothed with an exponential moving average
//! so a single noisy cycle cannot swing an agent's standing.

use serde::{Deserialize, Serialize};

/// One tracked performance axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationDimension {
    Accuracy,
    Speed,
    Impact,
    Honesty,
    RiskManagement,
}

impl ReputationDimension {
    pub const ALL: [ReputationDimension; 5] = [
        ReputationDimension::Accuracy,
        ReputationDimension::Speed,
        ReputationDimension::Impact,
        ReputationDimension::Honesty,
        ReputationDimension::RiskManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReputationDimension::Accuracy => "accuracy",
            ReputationDimension::Speed => "speed",
            ReputationDimension::Impact => "impact",
            ReputationDimension::Honesty => "honesty",
            ReputationDimension::RiskManagement => "risk_management",
        }
    }
}

impl std::fmt::Display for ReputationDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five dimension scores for one agent.
///
/// # Example
///
/// ```
/// use boardroom_domain::{ReputationDimension, ReputationScores};
///
/// let mut scores = ReputationScores::default();
/// assert_eq!(scores.overall(), 0.5);
///
/// scores.apply_ema(ReputationDimension::Speed, 1.0, 0.2);
/// assert!((scores.get(ReputationDimension::Speed) - 0.6).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReputationScores {
    pub accuracy: f64,
    pub speed: f64,
    pub impact: f64,
    pub honesty: f64,
    pub risk_management: f64,
}

impl Default for ReputationScores {
    /// Every agent starts at the neutral midpoint.
    fn default() -> Self {
        Self {
            accuracy: 0.5,
            speed: 0.5,
            impact: 0.5,
            honesty: 0.5,
            risk_management: 0.5,
        }
    }
}

impl ReputationScores {
    pub fn get(&self, dimension: ReputationDimension) -> f64 {
        match dimension {
            ReputationDimension::Accuracy => self.accuracy,
            ReputationDimension::Speed => self.speed,
            ReputationDimension::Impact => self.impact,
            ReputationDimension::Honesty => self.honesty,
            ReputationDimension::RiskManagement => self.risk_management,
        }
    }

    fn slot(&mut self, dimension: ReputationDimension) -> &mut f64 {
        match dimension {
            ReputationDimension::Accuracy => &mut self.accuracy,
            ReputationDimension::Speed => &mut self.speed,
            ReputationDimension::Impact => &mut self.impact,
            ReputationDimension::Honesty => &mut self.honesty,
            ReputationDimension::RiskManagement => &mut self.risk_management,
        }
    }

    /// `new = alpha * observed + (1 - alpha) * old`, clamped to [0, 1].
    pub fn apply_ema(&mut self, dimension: ReputationDimension, observed: f64, alpha: f64) {
        let slot = self.slot(dimension);
        *slot = (alpha * observed + (1.0 - alpha) * *slot).clamp(0.0, 1.0);
    }

    /// Equal-weight mean of the five dimensions.
    pub fn overall(&self) -> f64 {
        (self.accuracy + self.speed + self.impact + self.honesty + self.risk_management) / 5.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let scores = ReputationScores::default();
        for dimension in ReputationDimension::ALL {
            assert_eq!(scores.get(dimension), 0.5);
        }
        assert_eq!(scores.overall(), 0.5);
    }

    #[test]
    fn test_ema_favors_stability() {
        let mut scores = ReputationScores::default();
        scores.apply_ema(ReputationDimension::Accuracy, 1.0, 0.2);
        // One perfect observation only moves the needle by alpha.
        assert!((scores.accuracy - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_ema_converges_toward_observed() {
        let mut scores = ReputationScores::default();
        for _ in 0..50 {
            scores.apply_ema(ReputationDimension::Impact, 1.0, 0.2);
        }
        assert!(scores.impact > 0.99);
    }

    #[test]
    fn test_ema_stays_in_unit_interval() {
        let mut scores = ReputationScores::default();
        for _ in 0..100 {
            scores.apply_ema(ReputationDimension::Speed, 0.0, 0.9);
        }
        assert!(scores.speed >= 0.0);
    }

    #[test]
    fn test_overall_is_mean() {
        let scores = ReputationScores {
            accuracy: 1.0,
            speed: 0.0,
            impact: 1.0,
            honesty: 0.0,
            risk_management: 0.5,
        };
        assert!((scores.overall() - 0.5).abs() < 1e-9);
    }
}
