//! Domain layer for boardroom
//!
//! This crate contains the core governance logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## The panel
//!
//! Governance runs over a fixed panel of exactly ten agents, one per
//! [`AgentRole`]. The panel never grows or shrinks; what evolves is each
//! agent's reputation and, through it, its voting weight and access tier.
//!
//! ## The decision cycle
//!
//! A proposal moves `Draft -> CriticReviewed -> Open -> Closed`, or straight
//! to `Blocked` when it resembles a catalogued failure. Quorum requires
//! seven non-abstaining voters; the weighted tally breaks exact ties
//! toward rejection.

pub mod access;
pub mod agent;
pub mod core;
pub mod decision;
pub mod failure;
pub mod reputation;

// Re-export commonly used types
pub use access::{
    audit::{AuditEntry, AuditOutcome, AuditSink, NoAuditSink},
    controller::{AccessController, Principal},
    level::{AccessAction, AccessLevel, ResourceCategory},
    table::{AccessRule, AccessTable},
};
pub use agent::{
    registry::{Agent, AgentRegistry},
    role::AgentRole,
};
pub use crate::core::error::DomainError;
pub use decision::{
    critique::Critique,
    proposal::Proposal,
    record::{Decision, DecisionOutcome},
    stage::CycleStage,
    tally::{QuorumPolicy, TallyResult, tally},
    vote::{Vote, VoteValue},
};
pub use failure::{
    library::{FailureLibrary, PatternMatch, ScreenVerdict},
    pattern::{FailureCategory, FailurePattern, FailureSeverity},
};
pub use reputation::{
    delta::ReputationDelta,
    scores::{ReputationDimension, ReputationScores},
    store::{EvolutionDirection, EvolutionParams, ReputationStore, RoleEvolution},
};
