//! Access controller
//!
//! Every mutating operation in the engine goes through [`AccessController::check`]
//! before touching a resource. Denials are never retried and always leave
//! an audit record. Internally-triggered actions authenticate as the
//! distinguished [`Principal::System`], which passes every check but is
//! still audited.

use super::audit::{AuditEntry, AuditOutcome, AuditSink};
use super::level::{AccessAction, AccessLevel, ResourceCategory};
use super::table::AccessTable;
use crate::agent::role::AgentRole;
use crate::core::error::DomainError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Agent(AgentRole),
    /// The engine itself. Holds `AccessLevel::System` everywhere.
    System,
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Principal::Agent(role) => write!(f, "{}", role),
            Principal::System => write!(f, "system"),
        }
    }
}

/// Rule-table lookup plus reputation-driven tier shifts, with an audit
/// trail on every check.
pub struct AccessController {
    table: AccessTable,
    /// Net promotion (+) / demotion (-) count per role, applied only to
    /// categories whose configured level is `Write`.
    shifts: BTreeMap<AgentRole, i32>,
    audit: Arc<dyn AuditSink>,
}

impl AccessController {
    pub fn new(table: AccessTable, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            table,
            shifts: BTreeMap::new(),
            audit,
        }
    }

    /// Effective level for a principal on a category.
    ///
    /// Tier shifts move an agent's `Write`-tier categories up or down one
    /// step per net promotion, capped at `Admin` and floored at
    /// `ReadOnly`. Other categories keep their configured level.
    pub fn effective_level(&self, principal: Principal, category: ResourceCategory) -> AccessLevel {
        let role = match principal {
            Principal::System => return AccessLevel::System,
            Principal::Agent(role) => role,
        };

        let base = self.table.level_for(role, category);
        if base != AccessLevel::Write {
            return base;
        }

        let shift = self.shifts.get(&role).copied().unwrap_or(0);
        match shift.signum() {
            1 => base.promoted(),
            -1 => base.demoted(),
            _ => base,
        }
    }

    /// Allow or deny an action, recording the outcome either way.
    pub fn check(
        &self,
        principal: Principal,
        category: ResourceCategory,
        action: AccessAction,
    ) -> Result<(), DomainError> {
        let held = self.effective_level(principal, category);
        let allowed = held >= action.required_level();

        let outcome = if allowed {
            AuditOutcome::Allowed
        } else {
            AuditOutcome::Denied
        };
        self.audit
            .record(AuditEntry::new(principal.to_string(), category, action, outcome));

        if allowed {
            Ok(())
        } else {
            Err(DomainError::AccessDenied {
                principal: principal.to_string(),
                action,
                category,
            })
        }
    }

    /// Promote a role one tier on its write-category resources.
    pub fn promote(&mut self, role: AgentRole) {
        let shift = self.shifts.entry(role).or_insert(0);
        *shift = (*shift + 1).min(1);
    }

    /// Demote a role one tier on its write-category resources.
    pub fn demote(&mut self, role: AgentRole) {
        let shift = self.shifts.entry(role).or_insert(0);
        *shift = (*shift - 1).max(-1);
    }

    pub fn table(&self) -> &AccessTable {
        &self.table
    }

    pub fn shift(&self, role: AgentRole) -> i32 {
        self.shifts.get(&role).copied().unwrap_or(0)
    }
}
