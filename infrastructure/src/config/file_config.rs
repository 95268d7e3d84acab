//! On-disk configuration
//!
//! TOML-backed settings split into `[engine]` policy knobs, `[storage]`
//! paths, and `[[access]]` rule rows layered over the default table.
//! Unknown roles, categories, or levels in an access row are skipped
//! with a warning — a typo must never grant more than the default
//! read-only level.

use boardroom_application::BehaviorConfig;
use boardroom_domain::{
    AccessRule, AccessTable, AgentRole, EvolutionParams, QuorumPolicy,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Engine policy section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub screening_threshold: f64,
    pub ema_alpha: f64,
    pub quorum_min: usize,
    pub vote_timeout_secs: u64,
    pub vote_deadline_secs: u64,
    pub promote_threshold: f64,
    pub demote_threshold: f64,
    pub evolution_streak: u32,
    pub persist_attempts: u32,
    pub persist_backoff_ms: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        let behavior = BehaviorConfig::default();
        Self {
            screening_threshold: behavior.screening_threshold,
            ema_alpha: behavior.ema_alpha,
            quorum_min: behavior.quorum.min_participants,
            vote_timeout_secs: behavior.vote_timeout.as_secs(),
            vote_deadline_secs: behavior.vote_deadline.as_secs(),
            promote_threshold: behavior.evolution.promote_threshold,
            demote_threshold: behavior.evolution.demote_threshold,
            evolution_streak: behavior.evolution.streak,
            persist_attempts: behavior.persist_attempts,
            persist_backoff_ms: behavior.persist_backoff.as_millis() as u64,
        }
    }
}

/// Storage paths section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub data_dir: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("boardroom_data"),
        }
    }
}

impl StorageSection {
    pub fn ledger_dir(&self) -> PathBuf {
        self.data_dir.join("ledger")
    }

    pub fn meetings_dir(&self) -> PathBuf {
        self.data_dir.join("meetings")
    }

    pub fn board_dir(&self) -> PathBuf {
        self.data_dir.join("board")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.data_dir.join("audit.jsonl")
    }
}

/// One access override row: `[[access]] role = "qa" category = "board"
/// level = "write"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRow {
    pub role: String,
    pub category: String,
    pub level: String,
}

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub engine: EngineSection,
    pub storage: StorageSection,
    pub access: Vec<AccessRow>,
}

impl FileConfig {
    /// Engine policy derived from the `[engine]` section.
    pub fn behavior(&self) -> BehaviorConfig {
        BehaviorConfig {
            screening_threshold: self.engine.screening_threshold,
            ema_alpha: self.engine.ema_alpha,
            quorum: QuorumPolicy {
                min_participants: self.engine.quorum_min,
            },
            vote_timeout: Duration::from_secs(self.engine.vote_timeout_secs),
            vote_deadline: Duration::from_secs(self.engine.vote_deadline_secs),
            evolution: EvolutionParams {
                promote_threshold: self.engine.promote_threshold,
                demote_threshold: self.engine.demote_threshold,
                streak: self.engine.evolution_streak,
            },
            persist_attempts: self.engine.persist_attempts,
            persist_backoff: Duration::from_millis(self.engine.persist_backoff_ms),
        }
    }

    /// The default table with `[[access]]` rows layered on top.
    pub fn access_table(&self) -> AccessTable {
        let mut table = AccessTable::bootstrap();
        for row in &self.access {
            match parse_row(row) {
                Ok(rule) => table.set_level(rule.role, rule.category, rule.level),
                Err(reason) => {
                    warn!(
                        role = %row.role,
                        category = %row.category,
                        level = %row.level,
                        "skipping invalid access row: {}",
                        reason
                    );
                }
            }
        }
        table
    }
}

fn parse_row(row: &AccessRow) -> Result<AccessRule, String> {
    let role: AgentRole = row.role.parse()?;
    let category: boardroom_domain::ResourceCategory = row.category.parse()?;
    let level: boardroom_domain::AccessLevel = row.level.parse()?;
    Ok(AccessRule::new(role, category, level))
}
