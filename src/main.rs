//! Main entry point for the matchroom CLI
//!
//! `plan` turns a ratings snapshot plus skip counts into a match manifest,
//! `dispatch` runs a manifest's games through the configured game command and
//! reports the round, and `run` does both.

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use matchroom::config::{validate_config, AppConfig};
use matchroom::dispatch::{CommandGameRunner, Dispatcher, FileResultReporter};
use matchroom::engine::{MatchmakingEngine, Pool};
use matchroom::error::{classify, MatchmakingError};
use matchroom::input::{load_ratings, load_skip_counts, load_snapshot_csv, EloCsvLayout, EloSnapshot};
use matchroom::manifest::{read_manifest, JsonManifestWriter, ManifestWriter};
use matchroom::metrics::MetricsCollector;
use matchroom::types::Manifest;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Matchroom - skill-based lobby matchmaking over a ratings snapshot
#[derive(Parser)]
#[command(
    name = "matchroom",
    version,
    about = "Group rated players into fixed-size lobbies, favouring those who waited longest",
    long_about = "Matchroom reads a ratings snapshot and per-player skip counts, partitions the \
                 players into lobbies of a fixed size using a widening rating window, and writes \
                 a manifest of matches plus the players left out with their skip counts bumped. \
                 It can then hand every match to an external game command and report the results."
)]
struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        global = true,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, global = true, help = "Validate configuration and exit without doing any work")]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a match manifest from ratings and skip counts
    Plan(PlanArgs),
    /// Run the games of an existing manifest and report the round
    Dispatch {
        /// Manifest produced by `plan`
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,
        #[command(flatten)]
        dispatch: DispatchArgs,
    },
    /// Plan, then dispatch the resulting manifest
    Run {
        #[command(flatten)]
        plan: PlanArgs,
        #[command(flatten)]
        dispatch: DispatchArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RatingsFormat {
    /// JSON array or JSON Lines of {playerId, rating}
    Json,
    /// Rating engine player CSV export
    Csv,
}

#[derive(Args)]
struct PlanArgs {
    /// Rating records
    #[arg(long, value_name = "FILE")]
    ratings: PathBuf,

    /// Skip-count records (players without one start at zero)
    #[arg(long, value_name = "FILE")]
    skips: Option<PathBuf>,

    /// Layout of the ratings file
    #[arg(long, value_enum, default_value = "json")]
    ratings_format: RatingsFormat,

    /// With a CSV export, derive skip counts from each player's last contest
    /// time, counting one skip per this many seconds (ignored when --skips is given)
    #[arg(long, value_name = "SECONDS")]
    csv_round_seconds: Option<u64>,

    /// Where to write the manifest
    #[arg(long, value_name = "FILE", default_value = "matches.json")]
    out: PathBuf,

    /// Lobby size override
    #[arg(long, value_name = "N")]
    lobby_size: Option<usize>,

    /// Initial window width override
    #[arg(long, value_name = "RATING")]
    initial_window: Option<f64>,

    /// Window step override
    #[arg(long, value_name = "RATING")]
    window_step: Option<f64>,

    /// Maximum window width override
    #[arg(long, value_name = "RATING")]
    max_window: Option<f64>,

    /// Write Prometheus text metrics here after the run
    #[arg(long, value_name = "FILE")]
    metrics_out: Option<PathBuf>,
}

#[derive(Args)]
struct DispatchArgs {
    /// Where to write the round report
    #[arg(long, value_name = "FILE")]
    results: Option<PathBuf>,

    /// Game command override (whitespace separated; player ids are appended)
    #[arg(long, value_name = "COMMAND")]
    game_command: Option<String>,

    /// Concurrent games override
    #[arg(long, value_name = "N")]
    max_concurrent_games: Option<usize>,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file, environment and CLI arguments
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    if let Some(log_level) = &cli.log_level {
        config.service.log_level = log_level.clone();
    }
    if cli.debug {
        config.service.log_level = "debug".to_string();
    }

    let (plan, dispatch) = match &cli.command {
        Commands::Plan(plan) => (Some(plan), None),
        Commands::Dispatch { dispatch, .. } => (None, Some(dispatch)),
        Commands::Run { plan, dispatch } => (Some(plan), Some(dispatch)),
    };

    if let Some(plan) = plan {
        if let Some(size) = plan.lobby_size {
            config.matchmaking.lobby_size = size;
        }
        if let Some(window) = plan.initial_window {
            config.matchmaking.initial_window = window;
        }
        if let Some(step) = plan.window_step {
            config.matchmaking.window_step = step;
        }
        if let Some(max) = plan.max_window {
            config.matchmaking.max_window = max;
        }
    }

    if let Some(dispatch) = dispatch {
        if let Some(results) = &dispatch.results {
            config.dispatch.results_path = results.clone();
        }
        if let Some(command) = &dispatch.game_command {
            config.dispatch.game_command = command.split_whitespace().map(String::from).collect();
        }
        if let Some(max_games) = dispatch.max_concurrent_games {
            config.dispatch.max_concurrent_games = max_games;
        }
    }

    validate_config(&config)?;
    Ok(config)
}

/// Display startup information
fn display_startup_banner(config: &AppConfig) {
    info!("Matchroom {}", matchroom::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Lobby size: {}", config.matchmaking.lobby_size);
    info!(
        "   Window: {} (+{} per step, max {})",
        config.matchmaking.initial_window,
        config.matchmaking.window_step,
        config.matchmaking.max_window
    );
    info!(
        "   Max concurrent games: {}",
        config.dispatch.max_concurrent_games
    );
}

/// Map a failure to the process exit code
fn exit_code(err: &anyhow::Error) -> i32 {
    match classify(err) {
        Some(MatchmakingError::InputMalformed { .. }) => 2,
        Some(MatchmakingError::ConfigurationInvalid { .. }) => 3,
        _ => 1,
    }
}

/// Load inputs, run the engine and write the manifest
fn plan(config: &AppConfig, args: &PlanArgs, metrics: &MetricsCollector) -> Result<Manifest> {
    let engine = MatchmakingEngine::new(config.matchmaking.clone())?;

    let snapshot = match args.ratings_format {
        RatingsFormat::Json => EloSnapshot {
            ratings: load_ratings(&args.ratings)?,
            skips: Vec::new(),
        },
        RatingsFormat::Csv => {
            let round_seconds = args.csv_round_seconds.filter(|_| args.skips.is_none());
            load_snapshot_csv(&args.ratings, EloCsvLayout::default(), round_seconds)?
        }
    };
    let skips = match &args.skips {
        Some(path) => load_skip_counts(path)?,
        None => snapshot.skips,
    };
    let pool = Pool::from_records(snapshot.ratings, skips)?;
    if pool.is_empty() {
        warn!("No rated players in {}", args.ratings.display());
    }

    let timer = metrics.start_timer();
    let outcome = engine.run(&pool);
    metrics.record_run(&outcome, timer.stop());

    outcome
        .manifest
        .verify(&pool, config.matchmaking.lobby_size)?;
    JsonManifestWriter::new(&args.out).write_manifest(&outcome.manifest)?;

    if let Some(path) = &args.metrics_out {
        write_metrics(metrics, path)?;
    }

    Ok(outcome.manifest)
}

/// Dispatch a manifest's games and report the round
async fn dispatch(
    config: &AppConfig,
    manifest: &Manifest,
    metrics: Arc<MetricsCollector>,
) -> Result<()> {
    let runner = CommandGameRunner::new(&config.dispatch.game_command, config.game_timeout())?;
    let reporter = FileResultReporter::new(&config.dispatch.results_path);
    let dispatcher = Dispatcher::new(
        Arc::new(runner),
        Arc::new(reporter),
        config.dispatch.max_concurrent_games,
    )
    .with_metrics(metrics);

    let report = dispatcher.dispatch(manifest).await?;
    if !report.failures.is_empty() {
        error!(
            "{} of {} games failed; see {}",
            report.failures.len(),
            manifest.matches.len(),
            config.dispatch.results_path.display()
        );
    }
    Ok(())
}

fn write_metrics(metrics: &MetricsCollector, path: &Path) -> Result<()> {
    std::fs::write(path, metrics.render()?)
        .map_err(|e| anyhow!("Failed to write metrics to {}: {}", path.display(), e))
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let metrics = Arc::new(MetricsCollector::new()?);

    match cli.command {
        Commands::Plan(args) => {
            plan(&config, &args, &metrics)?;
        }
        Commands::Dispatch { manifest, .. } => {
            let manifest = read_manifest(&manifest)?;
            dispatch(&config, &manifest, metrics).await?;
        }
        Commands::Run { plan: args, .. } => {
            let manifest = plan(&config, &args, &metrics)?;
            dispatch(&config, &manifest, metrics.clone()).await?;
            if let Some(path) = &args.metrics_out {
                write_metrics(&metrics, path)?;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration errors are reported before logging exists
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(exit_code(&e));
        }
    };

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if cli.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting without doing any work");
        return;
    }

    if let Err(e) = run(cli, config).await {
        error!("Run failed: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}
