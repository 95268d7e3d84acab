//! CLI entrypoint for boardroom
//!
//! This is the main binary that wires together all layers using
//! dependency injection: file ledger, artifact pipeline, JSONL audit
//! sink, and the scripted reasoning gateway.

use anyhow::{Context, Result, bail};
use boardroom_application::{
    CycleProgress, DecisionLedger, EnginePhase, GovernanceEngine, RunCycleInput, rebuild_state,
};
use boardroom_domain::{AgentRole, AuditSink, NoAuditSink, Proposal, ResourceCategory};
use boardroom_infrastructure::{
    ConfigLoader, FileArtifactPipeline, FileConfig, FileLedger, JsonlAuditSink, ScriptedGateway,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boardroom", version, about = "Ten-seat governance engine")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Explicit config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mirror logs into this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one decision cycle over a proposal
    Run {
        /// Proposal title
        #[arg(long)]
        title: String,

        /// Proposal description
        #[arg(long)]
        description: String,

        /// Authoring seat (ceo, pm, cto, developer, qa, marketing,
        /// finance, critic, chair, archivist)
        #[arg(long, default_value = "ceo")]
        author: String,

        /// Resource categories the proposal touches, comma separated
        #[arg(long, value_delimiter = ',')]
        resources: Vec<String>,

        /// Institutional-memory note forwarded to every voter
        #[arg(long)]
        note: Vec<String>,

        /// Cost estimate recorded with the decision
        #[arg(long)]
        cost: Option<f64>,

        /// Revenue estimate recorded with the decision
        #[arg(long)]
        revenue: Option<f64>,

        /// Simulated provider latency in milliseconds
        #[arg(long)]
        latency_ms: Option<u64>,
    },

    /// Show restored panel state: weights, reputation, catalog size
    Status,

    /// List catalogued failure patterns
    Patterns,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let _log_guard = if let Some(log_file) = &cli.log_file {
        let dir = log_file.parent().unwrap_or_else(|| std::path::Path::new("."));
        let name = log_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "boardroom.log".to_string());
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
        None
    };

    info!("Starting boardroom");

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow::anyhow!("could not load configuration: {}", e))?;

    match cli.command {
        Command::Run {
            title,
            description,
            author,
            resources,
            note,
            cost,
            revenue,
            latency_ms,
        } => {
            let request = RunRequest {
                title,
                description,
                author,
                resources,
                note,
                cost,
                revenue,
                latency_ms,
            };
            run_cycle(&config, request).await
        }
        Command::Status => show_status(&config).await,
        Command::Patterns => show_patterns(&config).await,
        Command::Config => show_config(&config),
    }
}

/// Build the engine over restored ledger state, returning it together
/// with the number of cycles already on the ledger.
async fn build_engine(
    config: &FileConfig,
    gateway: ScriptedGateway,
) -> Result<(GovernanceEngine<ScriptedGateway>, u64)> {
    let behavior = config.behavior();
    let storage = &config.storage;

    let ledger = Arc::new(FileLedger::new(storage.ledger_dir()));
    let pipeline = Arc::new(FileArtifactPipeline::new(
        storage.meetings_dir(),
        storage.board_dir(),
    ));
    let audit: Arc<dyn AuditSink> = match JsonlAuditSink::new(storage.audit_log()) {
        Some(sink) => Arc::new(sink),
        None => Arc::new(NoAuditSink),
    };

    let registry = boardroom_domain::AgentRegistry::bootstrap();
    let records = ledger
        .restore()
        .await
        .context("ledger restore failed")?;
    let rebuilt = rebuild_state(&registry, &records, &behavior, config.access_table(), audit)
        .context("state rebuild failed")?;

    let cycles = rebuilt.cycles;
    let engine = GovernanceEngine::with_state(
        Arc::new(gateway),
        ledger,
        pipeline,
        registry,
        behavior,
        rebuilt.state,
        cycles,
    );
    Ok((engine, cycles))
}

/// Console progress: one line per phase.
struct ConsoleProgress;

impl CycleProgress for ConsoleProgress {
    fn on_phase_start(&self, phase: EnginePhase) {
        println!("==> {}", phase);
    }

    fn on_agent_done(&self, _phase: EnginePhase, agent: AgentRole, ok: bool) {
        println!("    {} {}", if ok { "+" } else { "!" }, agent);
    }

    fn on_phase_complete(&self, _phase: EnginePhase) {}
}

/// Everything `boardroom run` collects from the command line.
struct RunRequest {
    title: String,
    description: String,
    author: String,
    resources: Vec<String>,
    note: Vec<String>,
    cost: Option<f64>,
    revenue: Option<f64>,
    latency_ms: Option<u64>,
}

async fn run_cycle(config: &FileConfig, request: RunRequest) -> Result<()> {
    let author: AgentRole = match request.author.parse() {
        Ok(role) => role,
        Err(e) => bail!("{}", e),
    };
    let mut categories = Vec::new();
    for raw in &request.resources {
        let category: ResourceCategory = match raw.parse() {
            Ok(category) => category,
            Err(e) => bail!("{}", e),
        };
        categories.push(category);
    }

    let mut gateway = ScriptedGateway::new();
    if let Some(ms) = request.latency_ms {
        gateway = gateway.with_latency(Duration::from_millis(ms));
    }
    let (engine, cycles) = build_engine(config, gateway).await?;

    let proposal = Proposal::new(
        format!("proposal-{:05}", cycles),
        author,
        request.title,
        request.description,
    )
    .with_resources(categories);

    let input = RunCycleInput::new(proposal)
        .with_memory_notes(request.note)
        .with_estimates(request.cost, request.revenue);
    let output = engine.execute_with_progress(input, &ConsoleProgress).await?;

    println!();
    println!("Cycle {} closed", output.cycle_id);
    println!("Outcome: {}", output.decision.outcome);
    if let Some(score) = output.decision.score {
        println!("Weighted score: {:+.3}", score);
    }
    if let Some(cost) = output.decision.cost_estimate {
        println!("Cost estimate: {:.2}", cost);
    }
    if let Some(revenue) = output.decision.revenue_estimate {
        println!("Revenue estimate: {:.2}", revenue);
    }
    if let Some(reason) = &output.decision.defer_reason {
        println!("Deferred: {}", reason);
    }
    for matched in &output.decision.blocked_by {
        println!(
            "Blocked by {} (similarity {:.2})",
            matched.pattern_id, matched.similarity
        );
        println!("  root cause: {}", matched.root_cause);
        println!("  rule: {}", matched.preventive_rule);
    }
    if !output.decision.votes.is_empty() {
        println!();
        println!("Votes:");
        for vote in output.decision.votes.values() {
            println!(
                "  {:<10} {:<8} (weight {:.2})  {}",
                vote.agent.to_string(),
                vote.value.to_string(),
                vote.weight_at_cast,
                vote.rationale
            );
        }
    }
    if !output.unresponsive.is_empty() {
        let names: Vec<String> = output.unresponsive.iter().map(|r| r.to_string()).collect();
        println!("Recorded as abstentions (no response): {}", names.join(", "));
    }
    for evolution in &output.evolutions {
        println!("Role evolution: {} {:?}", evolution.role, evolution.direction);
    }

    Ok(())
}

async fn show_status(config: &FileConfig) -> Result<()> {
    let (engine, cycles) = build_engine(config, ScriptedGateway::new()).await?;
    let status = engine.status().await;

    println!("Committed cycles:   {}", cycles);
    println!("Reputation version: {}", status.reputation_version);
    println!("Failure patterns:   {}", status.pattern_count);
    println!();
    println!("Voting weights:");
    for (role, weight) in &status.weights {
        println!("  {:<10} {:.3}", role.to_string(), weight);
    }
    Ok(())
}

async fn show_patterns(config: &FileConfig) -> Result<()> {
    let registry = boardroom_domain::AgentRegistry::bootstrap();
    let ledger = FileLedger::new(config.storage.ledger_dir());
    let records = ledger.restore().await.context("ledger restore failed")?;
    let rebuilt = rebuild_state(
        &registry,
        &records,
        &config.behavior(),
        config.access_table(),
        Arc::new(NoAuditSink),
    )?;

    let patterns = rebuilt.state.failures.patterns();
    if patterns.is_empty() {
        println!("No failure patterns catalogued yet.");
        return Ok(());
    }
    for pattern in patterns {
        println!("{} [{}] ({})", pattern.id, pattern.category, pattern.severity);
        println!("  signature: {}", pattern.signature);
        println!("  root cause: {}", pattern.root_cause);
        println!("  rule: {}", pattern.preventive_rule);
    }
    Ok(())
}

fn show_config(config: &FileConfig) -> Result<()> {
    let text = toml::to_string_pretty(config).context("could not render configuration")?;
    println!("{}", text);
    Ok(())
}
