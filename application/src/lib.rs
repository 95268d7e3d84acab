//! Application layer for boardroom
//!
//! This crate contains use cases, port definitions, and behavioral
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    artifacts::{ArtifactKind, ArtifactPipeline, CycleArtifacts, TranscriptEntry, ValidationReport},
    ledger::{CommitBundle, DecisionLedger, LedgerRecord, OutcomeBatch, PersistenceError},
    progress::{CycleProgress, EnginePhase, NoProgress},
    reasoning::{Ballot, CycleContext, GatewayError, ReasoningGateway},
};
pub use use_cases::rebuild::{RebuiltState, rebuild_state};
pub use use_cases::run_cycle::{
    EngineState, EngineStatus, GovernanceEngine, RunCycleError, RunCycleInput, RunCycleOutput,
    ScoreOutcomeInput,
};
