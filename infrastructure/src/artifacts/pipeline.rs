//! File artifact pipeline
//!
//! Lays out one directory per cycle under the meetings root:
//!
//! ```text
//! meetings/
//!   index.json                 global cycle index
//!   <cycle_id>/
//!     transcript.jsonl
//!     minutes.md
//!     decisions.json
//!     reflections/<role>.md    one per participating agent
//! board/
//!   tasks.json                 task board, updated per cycle
//! ```
//!
//! Validation is pure inspection: a complete set validates complete any
//! number of times without side effects. An empty or unparseable file
//! counts as missing, so the retry pass rewrites it.

use async_trait::async_trait;
use boardroom_application::{
    ArtifactKind, ArtifactPipeline, CycleArtifacts, PersistenceError, TranscriptEntry,
    ValidationReport,
};
use boardroom_domain::{AgentRole, Decision};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CycleIndex {
    cycles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoardTask {
    cycle_id: String,
    description: String,
    status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TaskBoard {
    updated_for: Vec<String>,
    tasks: Vec<BoardTask>,
}

/// Artifact pipeline over the local filesystem.
pub struct FileArtifactPipeline {
    meetings_dir: PathBuf,
    board_dir: PathBuf,
}

impl FileArtifactPipeline {
    pub fn new(meetings_dir: impl Into<PathBuf>, board_dir: impl Into<PathBuf>) -> Self {
        Self {
            meetings_dir: meetings_dir.into(),
            board_dir: board_dir.into(),
        }
    }

    fn cycle_dir(&self, cycle_id: &str) -> PathBuf {
        self.meetings_dir.join(cycle_id)
    }

    fn index_path(&self) -> PathBuf {
        self.meetings_dir.join("index.json")
    }

    fn board_path(&self) -> PathBuf {
        self.board_dir.join("tasks.json")
    }

    async fn write_one(
        &self,
        artifacts: &CycleArtifacts,
        kind: ArtifactKind,
    ) -> Result<(), PersistenceError> {
        let dir = self.cycle_dir(&artifacts.cycle_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error(&dir, e))?;

        match kind {
            ArtifactKind::Transcript => {
                let mut lines = String::new();
                for entry in &artifacts.transcript {
                    let line = serde_json::to_string(entry)
                        .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
                    lines.push_str(&line);
                    lines.push('\n');
                }
                write_file(&dir.join("transcript.jsonl"), lines.as_bytes()).await?;
            }
            ArtifactKind::Minutes => {
                write_file(&dir.join("minutes.md"), artifacts.minutes.as_bytes()).await?;
            }
            ArtifactKind::Decisions => {
                let bytes = serde_json::to_vec_pretty(&artifacts.decision)
                    .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
                write_file(&dir.join("decisions.json"), &bytes).await?;
            }
            ArtifactKind::Reflection(role) => {
                let reflections_dir = dir.join("reflections");
                tokio::fs::create_dir_all(&reflections_dir)
                    .await
                    .map_err(|e| io_error(&reflections_dir, e))?;
                let text = artifacts
                    .reflections
                    .get(&role)
                    .cloned()
                    .unwrap_or_else(|| format!("No reflection recorded for {}.", role));
                write_file(&reflections_dir.join(format!("{}.md", role)), text.as_bytes()).await?;
            }
            ArtifactKind::IndexEntry => {
                let path = self.index_path();
                let mut index: CycleIndex = read_json_or_default(&path).await?;
                if !index.cycles.iter().any(|c| c == &artifacts.cycle_id) {
                    index.cycles.push(artifacts.cycle_id.clone());
                }
                let bytes = serde_json::to_vec_pretty(&index)
                    .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
                write_file(&path, &bytes).await?;
            }
            ArtifactKind::TaskBoard => {
                let path = self.board_path();
                let mut board: TaskBoard = read_json_or_default(&path).await?;
                if !board.updated_for.iter().any(|c| c == &artifacts.cycle_id) {
                    board.updated_for.push(artifacts.cycle_id.clone());
                    for item in task_items(&artifacts.decision) {
                        board.tasks.push(BoardTask {
                            cycle_id: artifacts.cycle_id.clone(),
                            description: item,
                            status: "open".to_string(),
                        });
                    }
                }
                let bytes = serde_json::to_vec_pretty(&board)
                    .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
                write_file(&path, &bytes).await?;
            }
        }

        debug!(cycle = %artifacts.cycle_id, artifact = %kind, "artifact written");
        Ok(())
    }

    async fn check_one(
        &self,
        cycle_id: &str,
        kind: ArtifactKind,
    ) -> Result<bool, PersistenceError> {
        let dir = self.cycle_dir(cycle_id);
        let present = match kind {
            ArtifactKind::Transcript => {
                match tokio::fs::read_to_string(dir.join("transcript.jsonl")).await {
                    Ok(content) => {
                        !content.trim().is_empty()
                            && content
                                .lines()
                                .all(|line| serde_json::from_str::<TranscriptEntry>(line).is_ok())
                    }
                    Err(_) => false,
                }
            }
            ArtifactKind::Minutes => non_empty(&dir.join("minutes.md")).await,
            ArtifactKind::Decisions => {
                match tokio::fs::read(dir.join("decisions.json")).await {
                    Ok(bytes) => serde_json::from_slice::<Decision>(&bytes).is_ok(),
                    Err(_) => false,
                }
            }
            ArtifactKind::Reflection(role) => {
                non_empty(&dir.join("reflections").join(format!("{}.md", role))).await
            }
            ArtifactKind::IndexEntry => {
                let index: CycleIndex = read_json_or_default(&self.index_path()).await?;
                index.cycles.iter().any(|c| c == cycle_id)
            }
            ArtifactKind::TaskBoard => {
                let board: TaskBoard = read_json_or_default(&self.board_path()).await?;
                board.updated_for.iter().any(|c| c == cycle_id)
            }
        };
        Ok(present)
    }
}

/// Mandatory set for a cycle with the given participants.
fn mandatory_set(participants: &[AgentRole]) -> Vec<ArtifactKind> {
    let mut kinds = vec![
        ArtifactKind::Transcript,
        ArtifactKind::Minutes,
        ArtifactKind::Decisions,
    ];
    kinds.extend(participants.iter().map(|role| ArtifactKind::Reflection(*role)));
    kinds.push(ArtifactKind::IndexEntry);
    kinds.push(ArtifactKind::TaskBoard);
    kinds
}

fn task_items(decision: &Decision) -> Vec<String> {
    if !decision.action_items.is_empty() {
        return decision.action_items.clone();
    }
    match decision.outcome {
        boardroom_domain::DecisionOutcome::Approved => {
            vec![format!("Execute approved decision {}", decision.id)]
        }
        _ => Vec::new(),
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| io_error(path, e))
}

async fn non_empty(path: &Path) -> bool {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => !content.trim().is_empty(),
        Err(_) => false,
    }
}

async fn read_json_or_default<T: Default + for<'de> Deserialize<'de>>(
    path: &Path,
) -> Result<T, PersistenceError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map_err(|e| PersistenceError::Corrupt(format!("{}: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(io_error(path, e)),
    }
}

fn io_error(path: &Path, error: std::io::Error) -> PersistenceError {
    PersistenceError::Io(format!("{}: {}", path.display(), error))
}

#[async_trait]
impl ArtifactPipeline for FileArtifactPipeline {
    async fn generate(&self, artifacts: &CycleArtifacts) -> Result<(), PersistenceError> {
        let participants: Vec<AgentRole> = artifacts.reflections.keys().copied().collect();
        tokio::fs::create_dir_all(&self.board_dir)
            .await
            .map_err(|e| io_error(&self.board_dir, e))?;

        for kind in mandatory_set(&participants) {
            self.write_one(artifacts, kind).await?;
        }
        Ok(())
    }

    async fn validate(
        &self,
        cycle_id: &str,
        participants: &[AgentRole],
    ) -> Result<ValidationReport, PersistenceError> {
        let mut missing = Vec::new();
        for kind in mandatory_set(participants) {
            if !self.check_one(cycle_id, kind).await? {
                missing.push(kind);
            }
        }
        Ok(ValidationReport { missing })
    }

    async fn regenerate(
        &self,
        artifacts: &CycleArtifacts,
        missing: &[ArtifactKind],
    ) -> Result<(), PersistenceError> {
        for kind in missing {
            self.write_one(artifacts, *kind).await?;
        }
        Ok(())
    }
}
