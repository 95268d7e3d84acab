//! Audit trail for access decisions
//!
//! Defines the [`AuditSink`] trait for recording access-check outcomes.
//! The sink is intentionally synchronous and non-fallible: an audit
//! backend that cannot keep up must never stall or fail a governance
//! cycle. Implementations live in the infrastructure layer.

use super::level::{AccessAction, ResourceCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Allowed,
    Denied,
}

/// One access-check record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// "system" or an agent role name.
    pub principal: String,
    pub category: ResourceCategory,
    pub action: AccessAction,
    pub outcome: AuditOutcome,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        principal: impl Into<String>,
        category: ResourceCategory,
        action: AccessAction,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            principal: principal.into(),
            category,
            action,
            outcome,
            timestamp: Utc::now(),
        }
    }
}

/// Sink for audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// No-op sink for tests and bare setups.
pub struct NoAuditSink;

impl AuditSink for NoAuditSink {
    fn record(&self, _entry: AuditEntry) {}
}
