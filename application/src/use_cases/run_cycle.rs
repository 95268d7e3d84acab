//! Run one decision cycle
//!
//! Orchestrates the full governance flow for a single proposal:
//! failure screening, the mandatory critic evaluation, parallel vote
//! collection under a shared deadline, quorum check and weighted tally,
//! artifact production with one bounded retry, and the atomic ledger
//! commit. Cycles are strictly sequential — the engine state lock is
//! held for the whole cycle.

use crate::config::BehaviorConfig;
use crate::ports::artifacts::{
    ArtifactPipeline, CycleArtifacts, TranscriptEntry, ValidationReport,
};
use crate::ports::ledger::{
    CommitBundle, DecisionLedger, LedgerRecord, OutcomeBatch, PersistenceError,
};
use crate::ports::progress::{CycleProgress, EnginePhase, NoProgress};
use crate::ports::reasoning::{CycleContext, GatewayError, ReasoningGateway};
use boardroom_domain::{
    AccessAction, AccessController, AgentRegistry, AgentRole, Critique, CycleStage, Decision,
    DomainError, EvolutionDirection, FailureLibrary, FailurePattern, Principal, Proposal,
    ReputationDelta, ReputationDimension, ReputationStore, ResourceCategory, RoleEvolution,
    ScreenVerdict, Vote, tally,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Errors that can end a cycle without a committed decision
#[derive(thiserror::Error, Debug)]
pub enum RunCycleError {
    #[error("critic evaluation failed: {0}")]
    CritiqueFailed(#[from] GatewayError),

    #[error("artifact set incomplete after retry, missing: {}", missing.join(", "))]
    ArtifactsIncomplete { missing: Vec<String> },

    #[error("artifact pipeline error: {0}")]
    Pipeline(#[source] PersistenceError),

    #[error("ledger commit failed after {attempts} attempts: {source}")]
    CommitFailed {
        attempts: u32,
        #[source]
        source: PersistenceError,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Input for one decision cycle.
#[derive(Debug, Clone)]
pub struct RunCycleInput {
    pub proposal: Proposal,
    /// Notes from institutional memory, forwarded to every voter.
    pub memory_notes: Vec<String>,
    /// Cost estimate attached to the decision record, when applicable.
    pub cost_estimate: Option<f64>,
    /// Revenue estimate attached to the decision record, when applicable.
    pub revenue_estimate: Option<f64>,
}

impl RunCycleInput {
    pub fn new(proposal: Proposal) -> Self {
        Self {
            proposal,
            memory_notes: Vec::new(),
            cost_estimate: None,
            revenue_estimate: None,
        }
    }

    pub fn with_memory_notes(mut self, notes: impl IntoIterator<Item = String>) -> Self {
        self.memory_notes = notes.into_iter().collect();
        self
    }

    pub fn with_estimates(mut self, cost: Option<f64>, revenue: Option<f64>) -> Self {
        self.cost_estimate = cost;
        self.revenue_estimate = revenue;
        self
    }
}

/// What a completed cycle hands back.
#[derive(Debug, Clone)]
pub struct RunCycleOutput {
    pub cycle_id: String,
    pub decision: Decision,
    pub critique: Option<Critique>,
    /// Promotions and demotions earned this cycle.
    pub evolutions: Vec<RoleEvolution>,
    /// Agents whose votes were recorded as abstentions because they
    /// timed out or their provider call failed.
    pub unresponsive: Vec<AgentRole>,
}

/// Post-hoc scoring input, once a decision's real-world outcome is known.
#[derive(Debug, Clone)]
pub struct ScoreOutcomeInput {
    pub cycle_id: String,
    pub observations: Vec<ReputationDelta>,
    /// Pattern to catalogue when the project is judged a failure.
    pub new_patterns: Vec<FailurePattern>,
}

/// Mutable governance state, owned by the engine and serialized behind
/// one lock so no two cycles ever interleave.
pub struct EngineState {
    pub reputation: ReputationStore,
    pub failures: FailureLibrary,
    pub access: AccessController,
}

/// Point-in-time summary for status displays.
#[derive(Debug, Clone)]
pub struct EngineStatus {
    pub reputation_version: u64,
    pub weights: BTreeMap<AgentRole, f64>,
    pub pattern_count: usize,
}

/// The governance engine: one instance drives all decision cycles.
pub struct GovernanceEngine<G: ReasoningGateway + 'static> {
    gateway: Arc<G>,
    ledger: Arc<dyn DecisionLedger>,
    artifacts: Arc<dyn ArtifactPipeline>,
    registry: AgentRegistry,
    config: BehaviorConfig,
    state: Mutex<EngineState>,
    cycle_seq: AtomicU64,
}

impl<G: ReasoningGateway + 'static> GovernanceEngine<G> {
    /// Engine over fresh state.
    pub fn new(
        gateway: Arc<G>,
        ledger: Arc<dyn DecisionLedger>,
        artifacts: Arc<dyn ArtifactPipeline>,
        registry: AgentRegistry,
        access: AccessController,
        config: BehaviorConfig,
    ) -> Self {
        let state = EngineState {
            reputation: ReputationStore::from_registry(&registry),
            failures: FailureLibrary::new(config.screening_threshold),
            access,
        };
        Self::with_state(gateway, ledger, artifacts, registry, config, state, 0)
    }

    /// Engine over restored state, continuing the cycle sequence.
    pub fn with_state(
        gateway: Arc<G>,
        ledger: Arc<dyn DecisionLedger>,
        artifacts: Arc<dyn ArtifactPipeline>,
        registry: AgentRegistry,
        config: BehaviorConfig,
        state: EngineState,
        next_seq: u64,
    ) -> Self {
        Self {
            gateway,
            ledger,
            artifacts,
            registry,
            config,
            state: Mutex::new(state),
            cycle_seq: AtomicU64::new(next_seq),
        }
    }

    pub async fn status(&self) -> EngineStatus {
        let state = self.state.lock().await;
        EngineStatus {
            reputation_version: state.reputation.version(),
            weights: state.reputation.snapshot_weights(),
            pattern_count: state.failures.len(),
        }
    }

    /// Run one cycle with no progress reporting.
    pub async fn execute(&self, input: RunCycleInput) -> Result<RunCycleOutput, RunCycleError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Run one cycle, reporting phase progress.
    pub async fn execute_with_progress(
        &self,
        input: RunCycleInput,
        progress: &dyn CycleProgress,
    ) -> Result<RunCycleOutput, RunCycleError> {
        // One cycle at a time: the lock spans the whole flow.
        let mut state = self.state.lock().await;

        let seq = self.cycle_seq.fetch_add(1, Ordering::SeqCst);
        let cycle_id = format!("cycle-{:05}", seq);
        let decision_id = format!("decision-{:05}", seq);
        let proposal = input.proposal;

        info!(cycle = %cycle_id, proposal = %proposal.id, "starting decision cycle");

        // The author needs write access to everything the proposal touches.
        for category in proposal.resources_touched.clone() {
            state
                .access
                .check(Principal::Agent(proposal.author), category, AccessAction::Write)?;
        }

        let mut stage = CycleStage::Draft;
        let mut transcript = Vec::new();

        // Phase 1: failure screening
        progress.on_phase_start(EnginePhase::Screening);
        let verdict = state.failures.screen(&proposal);
        progress.on_phase_complete(EnginePhase::Screening);

        if let ScreenVerdict::Blocked { matches, confidence } = verdict {
            stage = stage.advance(CycleStage::Blocked)?;
            warn!(
                cycle = %cycle_id,
                confidence,
                patterns = matches.len(),
                "proposal blocked by failure screening"
            );
            transcript.push(TranscriptEntry::new(
                "system",
                format!(
                    "proposal blocked: {} known failure pattern(s), confidence {:.2}",
                    matches.len(),
                    confidence
                ),
                "screening",
            ));

            let decision = Decision::blocked(decision_id, proposal, matches);
            let artifacts = build_artifacts(&cycle_id, transcript, &decision, BTreeMap::new());
            self.produce_artifacts(&artifacts, &[], progress).await?;

            let record = LedgerRecord::Cycle(CommitBundle {
                cycle_id: cycle_id.clone(),
                decision: decision.clone(),
                reputation_deltas: Vec::new(),
                new_patterns: Vec::new(),
            });
            self.commit_with_retry(&state, &record, progress).await?;
            debug_assert_eq!(stage, CycleStage::Blocked);

            return Ok(RunCycleOutput {
                cycle_id,
                decision,
                critique: None,
                evolutions: Vec::new(),
                unresponsive: Vec::new(),
            });
        }
        transcript.push(TranscriptEntry::new(
            "system",
            "proposal cleared failure screening",
            "screening",
        ));

        // Phase 2: mandatory critic evaluation
        progress.on_phase_start(EnginePhase::Critique);
        let critique = tokio::time::timeout(
            self.config.vote_timeout,
            self.gateway.critique(AgentRole::Critic, &proposal),
        )
        .await
        .map_err(|_| GatewayError::Timeout)??;
        stage = stage.advance(CycleStage::CriticReviewed)?;
        progress.on_agent_done(EnginePhase::Critique, AgentRole::Critic, true);
        progress.on_phase_complete(EnginePhase::Critique);
        transcript.push(TranscriptEntry::new(
            AgentRole::Critic.as_str(),
            critique.summary.clone(),
            "critique",
        ));

        // Phase 3: open the vote
        stage = stage.advance(CycleStage::Open)?;
        state
            .access
            .check(Principal::System, ResourceCategory::Voting, AccessAction::Write)?;
        let weights = state.reputation.snapshot_weights();
        let context = CycleContext {
            cycle_id: cycle_id.clone(),
            memory_notes: input.memory_notes,
        };

        progress.on_phase_start(EnginePhase::Voting);
        let (votes, unresponsive) = self
            .collect_votes(&proposal, &weights, &context, progress)
            .await;
        progress.on_phase_complete(EnginePhase::Voting);

        for vote in votes.values() {
            transcript.push(TranscriptEntry::new(
                vote.agent.as_str(),
                format!("{}: {}", vote.value, vote.rationale),
                "vote",
            ));
        }

        // Phase 4: close and tally. The critique predates this point by
        // construction; the record keeps both timestamps as proof.
        stage = stage.advance(CycleStage::Closed)?;
        let result = tally(&votes, self.config.quorum);
        let decision = Decision::from_tally(decision_id, proposal, votes, &result)
            .with_estimates(input.cost_estimate, input.revenue_estimate);
        debug_assert!(critique.issued_at < decision.closed_at);
        debug_assert!(stage.is_terminal());

        info!(
            cycle = %cycle_id,
            outcome = %decision.outcome,
            quorum_met = decision.quorum_met,
            participants = result.participants,
            "vote closed"
        );
        transcript.push(TranscriptEntry::new(
            "system",
            format!("outcome: {}", decision.outcome),
            "outcome",
        ));

        // Phase 5: artifacts, with one bounded retry inside
        let participants = decision.participants();
        let reflections = self.collect_reflections(&decision, &participants).await;
        let artifacts = build_artifacts(&cycle_id, transcript, &decision, reflections);
        self.produce_artifacts(&artifacts, &participants, progress)
            .await?;

        // Phase 6: atomic commit, then fold the outcome back into
        // reputation. State only mutates once the ledger confirms.
        let deltas = participation_deltas(&decision, &unresponsive);
        let record = LedgerRecord::Cycle(CommitBundle {
            cycle_id: cycle_id.clone(),
            decision: decision.clone(),
            reputation_deltas: deltas.clone(),
            new_patterns: Vec::new(),
        });
        self.commit_with_retry(&state, &record, progress).await?;

        for delta in &deltas {
            state.reputation.apply_delta(delta, self.config.ema_alpha)?;
        }
        let evolutions = state.reputation.evaluate_cycle(self.config.evolution);
        apply_evolutions(&mut state.access, &evolutions);

        Ok(RunCycleOutput {
            cycle_id,
            decision,
            critique: Some(critique),
            evolutions,
            unresponsive,
        })
    }

    /// Fold in post-hoc observations for a closed cycle.
    pub async fn score_outcome(
        &self,
        input: ScoreOutcomeInput,
    ) -> Result<Vec<RoleEvolution>, RunCycleError> {
        let mut state = self.state.lock().await;

        state
            .access
            .check(Principal::System, ResourceCategory::MemorySystem, AccessAction::Write)?;

        // Validate before committing; replay must never hit a bad delta.
        for delta in &input.observations {
            if !(0.0..=1.0).contains(&delta.observed) {
                return Err(DomainError::ObservedOutOfRange(delta.observed).into());
            }
        }

        let record = LedgerRecord::OutcomeScores(OutcomeBatch {
            cycle_id: input.cycle_id.clone(),
            deltas: input.observations.clone(),
            new_patterns: input.new_patterns.clone(),
        });
        self.commit_with_retry(&state, &record, &NoProgress).await?;

        for delta in &input.observations {
            state.reputation.apply_delta(delta, self.config.ema_alpha)?;
        }
        for pattern in input.new_patterns {
            info!(pattern = %pattern.id, "failure pattern catalogued");
            state.failures.record(pattern);
        }
        let evolutions = state.reputation.evaluate_cycle(self.config.evolution);
        apply_evolutions(&mut state.access, &evolutions);

        Ok(evolutions)
    }

    /// One task per agent, each with its own timeout, all bounded by the
    /// shared deadline. Late or failing agents become abstentions; once
    /// the deadline fires the stragglers are cancelled and whatever they
    /// eventually answer is discarded.
    async fn collect_votes(
        &self,
        proposal: &Proposal,
        weights: &BTreeMap<AgentRole, f64>,
        context: &CycleContext,
        progress: &dyn CycleProgress,
    ) -> (BTreeMap<AgentRole, Vote>, Vec<AgentRole>) {
        let mut join_set = JoinSet::new();

        for agent in self.registry.iter() {
            let gateway = Arc::clone(&self.gateway);
            let role = agent.role;
            let proposal = proposal.clone();
            let context = context.clone();
            let per_agent = self.config.vote_timeout;

            join_set.spawn(async move {
                let result =
                    tokio::time::timeout(per_agent, gateway.cast_vote(role, &proposal, &context))
                        .await;
                (role, result)
            });
        }

        let mut votes: BTreeMap<AgentRole, Vote> = BTreeMap::new();
        let mut unresponsive = Vec::new();
        let deadline = tokio::time::Instant::now() + self.config.vote_deadline;
        let weight_of =
            |role: AgentRole| weights.get(&role).copied().unwrap_or_else(|| role.base_weight());

        loop {
            let joined = match tokio::time::timeout_at(deadline, join_set.join_next()).await {
                Ok(Some(joined)) => joined,
                Ok(None) => break,
                Err(_) => {
                    // Shared deadline: cancel stragglers, discard late answers.
                    warn!("vote deadline elapsed, cancelling pending agents");
                    join_set.abort_all();
                    break;
                }
            };

            match joined {
                Ok((role, Ok(Ok(ballot)))) => {
                    debug!(agent = %role, value = %ballot.value, "vote received");
                    progress.on_agent_done(EnginePhase::Voting, role, true);
                    votes.insert(
                        role,
                        Vote::new(role, proposal.id.as_str(), ballot.value, weight_of(role), ballot.rationale),
                    );
                }
                Ok((role, Ok(Err(error)))) => {
                    warn!(agent = %role, "vote request failed: {}", error);
                    progress.on_agent_done(EnginePhase::Voting, role, false);
                    unresponsive.push(role);
                    votes.insert(
                        role,
                        Vote::abstain(
                            role,
                            proposal.id.as_str(),
                            weight_of(role),
                            format!("no response: {}", error),
                        ),
                    );
                }
                Ok((role, Err(_elapsed))) => {
                    warn!(agent = %role, "vote timed out, recording abstention");
                    progress.on_agent_done(EnginePhase::Voting, role, false);
                    unresponsive.push(role);
                    votes.insert(
                        role,
                        Vote::abstain(role, proposal.id.as_str(), weight_of(role), "timed out"),
                    );
                }
                Err(join_error) => {
                    warn!("vote task join error: {}", join_error);
                }
            }
        }

        // Agents cut off by the shared deadline abstain as well.
        for agent in self.registry.iter() {
            let role = agent.role;
            if !votes.contains_key(&role) {
                unresponsive.push(role);
                votes.insert(
                    role,
                    Vote::abstain(role, proposal.id.as_str(), weight_of(role), "deadline elapsed"),
                );
            }
        }

        (votes, unresponsive)
    }

    /// One reflection per participating agent. A provider failure here
    /// must not sink the cycle, so failures degrade to a stub the
    /// validator still accepts.
    async fn collect_reflections(
        &self,
        decision: &Decision,
        participants: &[AgentRole],
    ) -> BTreeMap<AgentRole, String> {
        let mut join_set = JoinSet::new();

        for role in participants.iter().copied() {
            let gateway = Arc::clone(&self.gateway);
            let decision = decision.clone();
            let per_agent = self.config.vote_timeout;

            join_set.spawn(async move {
                let result =
                    tokio::time::timeout(per_agent, gateway.reflect(role, &decision)).await;
                (role, result)
            });
        }

        let mut reflections = BTreeMap::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((role, Ok(Ok(text)))) => {
                    reflections.insert(role, text);
                }
                Ok((role, Ok(Err(error)))) => {
                    warn!(agent = %role, "reflection failed: {}", error);
                    reflections.insert(role, format!("Reflection unavailable: {}", error));
                }
                Ok((role, Err(_elapsed))) => {
                    warn!(agent = %role, "reflection timed out");
                    reflections.insert(role, "Reflection unavailable: timed out".to_string());
                }
                Err(join_error) => {
                    warn!("reflection task join error: {}", join_error);
                }
            }
        }
        reflections
    }

    /// Generate, validate, and — at most once — regenerate the missing
    /// pieces. A set still incomplete after the retry is terminal.
    async fn produce_artifacts(
        &self,
        artifacts: &CycleArtifacts,
        participants: &[AgentRole],
        progress: &dyn CycleProgress,
    ) -> Result<(), RunCycleError> {
        progress.on_phase_start(EnginePhase::Artifacts);

        self.artifacts
            .generate(artifacts)
            .await
            .map_err(RunCycleError::Pipeline)?;

        let report = self
            .artifacts
            .validate(&artifacts.cycle_id, participants)
            .await
            .map_err(RunCycleError::Pipeline)?;
        if report.is_complete() {
            progress.on_phase_complete(EnginePhase::Artifacts);
            return Ok(());
        }

        warn!(
            cycle = %artifacts.cycle_id,
            missing = ?report.missing.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "artifact set incomplete, regenerating missing pieces"
        );
        self.artifacts
            .regenerate(artifacts, &report.missing)
            .await
            .map_err(RunCycleError::Pipeline)?;

        let report: ValidationReport = self
            .artifacts
            .validate(&artifacts.cycle_id, participants)
            .await
            .map_err(RunCycleError::Pipeline)?;
        if report.is_complete() {
            progress.on_phase_complete(EnginePhase::Artifacts);
            return Ok(());
        }

        let missing: Vec<String> = report.missing.iter().map(ToString::to_string).collect();
        // Terminal: artifacts produced so far are retained, nothing rolls back.
        error!(
            cycle = %artifacts.cycle_id,
            missing = ?missing,
            "cycle FAILED: artifact set incomplete after retry"
        );
        Err(RunCycleError::ArtifactsIncomplete { missing })
    }

    /// Commit with bounded retry and doubling backoff. Exhaustion aborts
    /// the cycle — a cycle is never reported successful without a
    /// confirmed commit.
    async fn commit_with_retry(
        &self,
        state: &EngineState,
        record: &LedgerRecord,
        progress: &dyn CycleProgress,
    ) -> Result<(), RunCycleError> {
        state.access.check(
            Principal::System,
            ResourceCategory::MemorySystem,
            AccessAction::Write,
        )?;

        progress.on_phase_start(EnginePhase::Commit);
        let attempts = self.config.persist_attempts.max(1);
        let mut backoff = self.config.persist_backoff;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.ledger.commit(record).await {
                Ok(()) => {
                    if attempt > 1 {
                        info!(attempt, "ledger commit succeeded after retry");
                    }
                    progress.on_phase_complete(EnginePhase::Commit);
                    return Ok(());
                }
                Err(persistence_error) => {
                    warn!(attempt, "ledger commit failed: {}", persistence_error);
                    last_error = Some(persistence_error);
                    if attempt < attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        let Some(source) = last_error else {
            return Ok(());
        };
        error!(
            cycle = %record.cycle_id(),
            attempts,
            "cycle aborted: ledger commit exhausted retries"
        );
        Err(RunCycleError::CommitFailed { attempts, source })
    }
}

fn apply_evolutions(access: &mut AccessController, evolutions: &[RoleEvolution]) {
    for evolution in evolutions {
        match evolution.direction {
            EvolutionDirection::Promoted => {
                info!(agent = %evolution.role, "access promoted on write-tier resources");
                access.promote(evolution.role);
            }
            EvolutionDirection::Demoted => {
                warn!(agent = %evolution.role, "access demoted on write-tier resources");
                access.demote(evolution.role);
            }
        }
    }
}

fn build_artifacts(
    cycle_id: &str,
    transcript: Vec<TranscriptEntry>,
    decision: &Decision,
    reflections: BTreeMap<AgentRole, String>,
) -> CycleArtifacts {
    CycleArtifacts {
        cycle_id: cycle_id.to_string(),
        transcript,
        minutes: render_minutes(cycle_id, decision),
        decision: decision.clone(),
        reflections,
    }
}

fn render_minutes(cycle_id: &str, decision: &Decision) -> String {
    let mut minutes = String::new();
    minutes.push_str(&format!("# Minutes — {}\n\n", cycle_id));
    minutes.push_str("## Meeting\n\n");
    minutes.push_str(&format!(
        "Proposal `{}` by {}: {}\n\n",
        decision.proposal.id, decision.proposal.author, decision.proposal.title
    ));
    minutes.push_str("## Discussion\n\n");
    if decision.votes.is_empty() {
        minutes.push_str("No vote was opened.\n\n");
    } else {
        for vote in decision.votes.values() {
            minutes.push_str(&format!(
                "- {} voted {} (weight {:.2}): {}\n",
                vote.agent, vote.value, vote.weight_at_cast, vote.rationale
            ));
        }
        minutes.push('\n');
    }
    minutes.push_str("## Decisions\n\n");
    minutes.push_str(&format!("Outcome: **{}**", decision.outcome));
    if let Some(reason) = &decision.defer_reason {
        minutes.push_str(&format!(" ({})", reason));
    }
    minutes.push('\n');
    for matched in &decision.blocked_by {
        minutes.push_str(&format!(
            "\nBlocked by `{}` — root cause: {}; rule: {}\n",
            matched.pattern_id, matched.root_cause, matched.preventive_rule
        ));
    }
    minutes
}

/// Immediate, participation-based observations for a closed cycle.
///
/// Speed scores response discipline for every seat, the advisory one
/// included. Accuracy and impact only apply when the outcome is binding.
fn participation_deltas(decision: &Decision, unresponsive: &[AgentRole]) -> Vec<ReputationDelta> {
    let mut deltas = Vec::new();

    for vote in decision.votes.values() {
        let responded = !unresponsive.contains(&vote.agent);
        deltas.push(ReputationDelta::new(
            vote.agent,
            ReputationDimension::Speed,
            if responded { 1.0 } else { 0.0 },
        ));

        if decision.outcome.is_binding() && vote.value.is_counted() {
            let aligned = vote.value.numeric() * decision.score.unwrap_or(0.0) > 0.0;
            deltas.push(ReputationDelta::new(
                vote.agent,
                ReputationDimension::Accuracy,
                if aligned { 1.0 } else { 0.25 },
            ));
        }
    }

    if decision.outcome.is_binding() {
        let landed = decision.outcome == boardroom_domain::DecisionOutcome::Approved;
        deltas.push(ReputationDelta::new(
            decision.proposal.author,
            ReputationDimension::Impact,
            if landed { 0.9 } else { 0.35 },
        ));
    }

    deltas
}
