//! CLI entrypoint for agora
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use agora_application::{
    NoProgress, Orchestrator, OrchestratorError, ProgressNotifier, SnapshotStore,
};
use agora_domain::agent::validation::{ConfigIssue, Severity};
use agora_infrastructure::{
    ConfigLoader, FileConfig, FileSnapshotStore, JsonlConversationLogger, OpenRouterGateway,
};
use agora_presentation::{
    Cli, ConsoleFormatter, DiscussionReport, OutputFormat, ProgressReporter, SimpleProgress,
};
use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use secrecy::Secret;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the endpoint credential
const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the key may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {e}"))?
    };
    apply_overrides(&mut config, &cli);

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| config.logging.log_dir.as_ref().map(PathBuf::from));
    let _log_guard = init_tracing(cli.verbose, log_dir.as_deref())?;

    info!("Starting agora");

    check_config(&config.validate())?;

    let topic = read_topic(&cli)?;
    let api_key = match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Secret::new(key),
        _ => bail!("{API_KEY_VAR} is not set (export it or add it to a .env file)"),
    };

    // === Dependency Injection ===
    let gateway = Arc::new(OpenRouterGateway::new(
        config.api.to_openrouter_config(api_key),
    )?);
    let roster = config.roster()?;
    let snapshot_dir = PathBuf::from(&config.discussion.snapshot_dir);
    let store: Arc<dyn SnapshotStore> = Arc::new(FileSnapshotStore::new(&snapshot_dir));

    if let Some(latest) = store.latest_round().await? {
        warn!(
            "{} already holds snapshots up to round {}; they will be overwritten",
            snapshot_dir.display(),
            latest
        );
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let mut orchestrator = Orchestrator::from_roster(
        gateway,
        &roster,
        config.summarizer.to_spec(),
        config.api.to_retry_policy(),
        store,
        config.discussion.to_params(),
    )?
    .with_cancellation(cancel);

    if let Some(path) = &config.logging.conversation_log {
        match JsonlConversationLogger::create(path) {
            Ok(logger) => {
                info!("Writing discussion transcript to {}", logger.path().display());
                orchestrator = orchestrator.with_conversation_logger(Arc::new(logger));
            }
            Err(e) => warn!("Could not open transcript {}: {}", path, e),
        }
    }

    // Keep stdout clean for JSON consumers
    let plain_stdout = cli.output == OutputFormat::Json;

    if !cli.quiet && !plain_stdout {
        print_header(&topic, &roster_names(&config), config.discussion.max_rounds);
    }

    orchestrator.initialize(&topic).await?;

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else if plain_stdout {
        Box::new(NoProgress)
    } else {
        Box::new(SimpleProgress)
    };

    // Snapshot write failures are retried until they succeed or Ctrl-C
    let outcome = match orchestrator.run_until_durable(progress.as_ref()).await {
        Ok(outcome) => outcome,
        Err(e @ OrchestratorError::Persistence { .. }) => {
            error!("{e}");
            bail!(
                "Interrupted after round {}: snapshots in {} could not be written",
                orchestrator.rounds_completed(),
                snapshot_dir.display()
            );
        }
        Err(e) => return Err(e.into()),
    };

    let points = orchestrator
        .chain()
        .map(|chain| chain.points())
        .unwrap_or_default();
    let report = DiscussionReport {
        topic: &topic,
        outcome: &outcome,
        points,
    };

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Summary => ConsoleFormatter::format_summary_only(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };

    println!("{}", output);

    Ok(())
}

fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(max_rounds) = cli.max_rounds {
        config.discussion.max_rounds = max_rounds;
    }
    if let Some(dir) = &cli.snapshot_dir {
        config.discussion.snapshot_dir = dir.display().to_string();
    }
}

/// Console logging by verbosity, plus an optional plain-text log file
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create log directory {}", dir.display()))?;
            let file_name = format!(
                "discussion_{}.log",
                chrono::Utc::now().format("%Y%m%d_%H%M%S")
            );
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn check_config(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        match issue.severity {
            Severity::Warning => warn!("config: {}", issue.message),
            Severity::Error => eprintln!("{issue}"),
        }
    }
    if ConfigIssue::has_errors(issues) {
        bail!("Invalid configuration; fix the errors above and retry");
    }
    Ok(())
}

fn read_topic(cli: &Cli) -> Result<String> {
    let topic = match (&cli.topic, &cli.topic_file) {
        (Some(topic), _) => topic.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read topic file {}", path.display()))?,
        (None, None) => bail!("A topic is required (pass it as an argument or use --topic-file)"),
    };
    if topic.trim().is_empty() {
        bail!("The topic is empty");
    }
    Ok(topic.trim().to_string())
}

/// Request a graceful stop between rounds on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current round");
            cancel.cancel();
        }
    });
}

fn roster_names(config: &FileConfig) -> String {
    config
        .agents
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_header(topic: &str, agents: &str, max_rounds: u32) {
    println!();
    println!("+============================================================+");
    println!("|                 Agora - Multi-Agent Debate                 |");
    println!("+============================================================+");
    println!();
    println!("Topic: {}", topic);
    println!("Agents: {}", agents);
    println!("Rounds: up to {}", max_rounds);
    println!();
}
