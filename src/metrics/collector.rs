//! Metrics collection using Prometheus
//!
//! This module records per-run matchmaking and dispatch counters. The binary
//! is short-lived, so instead of serving an endpoint the registry is rendered
//! in text exposition format and written next to the manifest.

use crate::engine::MatchOutcome;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for matchroom
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Matchmaking pass metrics
    engine_metrics: EngineMetrics,

    /// Game dispatch metrics
    dispatch_metrics: DispatchMetrics,
}

/// Matchmaking pass metrics
#[derive(Clone)]
pub struct EngineMetrics {
    /// Completed matchmaking runs
    pub runs_total: IntCounter,

    /// Players in the most recent pool
    pub pool_size: IntGauge,

    /// Matches formed
    pub matches_formed_total: IntCounter,

    /// Players placed into matches
    pub players_matched_total: IntCounter,

    /// Players left unmatched
    pub players_unmatched_total: IntCounter,

    /// Seeds that could not fill a lobby even at the widest window
    pub seeds_unplaceable_total: IntCounter,

    /// Window widening steps taken
    pub window_widenings_total: IntCounter,

    /// Window width at which each match formed
    pub match_window_width: Histogram,

    /// Wall time of one run
    pub run_duration: Histogram,
}

/// Game dispatch metrics
#[derive(Clone)]
pub struct DispatchMetrics {
    /// Game executions by outcome (completed, failed)
    pub games_total: IntCounterVec,

    /// Duration of a single game execution
    pub game_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let engine_metrics = EngineMetrics::new(&registry)?;
        let dispatch_metrics = DispatchMetrics::new(&registry)?;

        Ok(Self {
            registry,
            engine_metrics,
            dispatch_metrics,
        })
    }

    /// Record a finished matchmaking run
    pub fn record_run(&self, outcome: &MatchOutcome, duration: Duration) {
        let summary = &outcome.summary;
        let engine = &self.engine_metrics;

        engine.runs_total.inc();
        engine.pool_size.set(summary.pool_size as i64);
        engine.matches_formed_total.inc_by(summary.matches_formed as u64);
        engine.players_matched_total.inc_by(summary.players_matched as u64);
        engine.players_unmatched_total.inc_by(summary.unmatched as u64);
        engine.seeds_unplaceable_total.inc_by(summary.seeds_unplaceable as u64);
        engine.window_widenings_total.inc_by(summary.widenings as u64);

        for m in &outcome.manifest.matches {
            engine.match_window_width.observe(m.window);
        }
        engine.run_duration.observe(duration.as_secs_f64());
    }

    /// Record one game execution
    pub fn record_game(&self, success: bool, duration: Duration) {
        let status = if success { "completed" } else { "failed" };

        self.dispatch_metrics
            .games_total
            .with_label_values(&[status])
            .inc();
        self.dispatch_metrics
            .game_duration
            .observe(duration.as_secs_f64());
    }

    /// Render every registered metric in Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl EngineMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let runs_total = IntCounter::new("matchroom_runs_total", "Completed matchmaking runs")?;
        registry.register(Box::new(runs_total.clone()))?;

        let pool_size = IntGauge::new("matchroom_pool_size", "Players in the latest pool")?;
        registry.register(Box::new(pool_size.clone()))?;

        let matches_formed_total =
            IntCounter::new("matchroom_matches_formed_total", "Total matches formed")?;
        registry.register(Box::new(matches_formed_total.clone()))?;

        let players_matched_total = IntCounter::new(
            "matchroom_players_matched_total",
            "Total players placed into matches",
        )?;
        registry.register(Box::new(players_matched_total.clone()))?;

        let players_unmatched_total = IntCounter::new(
            "matchroom_players_unmatched_total",
            "Total players left unmatched",
        )?;
        registry.register(Box::new(players_unmatched_total.clone()))?;

        let seeds_unplaceable_total = IntCounter::new(
            "matchroom_seeds_unplaceable_total",
            "Seeds that could not fill a lobby",
        )?;
        registry.register(Box::new(seeds_unplaceable_total.clone()))?;

        let window_widenings_total = IntCounter::new(
            "matchroom_window_widenings_total",
            "Window widening steps taken",
        )?;
        registry.register(Box::new(window_widenings_total.clone()))?;

        let match_window_width = Histogram::with_opts(
            HistogramOpts::new(
                "matchroom_match_window_width",
                "Rating window width at which matches formed",
            )
            .buckets(vec![100.0, 200.0, 300.0, 400.0, 600.0, 800.0, 1000.0, 1500.0]),
        )?;
        registry.register(Box::new(match_window_width.clone()))?;

        let run_duration = Histogram::with_opts(
            HistogramOpts::new(
                "matchroom_run_duration_seconds",
                "Time spent in one matchmaking run",
            )
            .buckets(vec![0.0001, 0.001, 0.01, 0.1, 1.0]),
        )?;
        registry.register(Box::new(run_duration.clone()))?;

        Ok(Self {
            runs_total,
            pool_size,
            matches_formed_total,
            players_matched_total,
            players_unmatched_total,
            seeds_unplaceable_total,
            window_widenings_total,
            match_window_width,
            run_duration,
        })
    }
}

impl DispatchMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let games_total = IntCounterVec::new(
            Opts::new("matchroom_games_total", "Game executions by outcome"),
            &["status"],
        )?;
        registry.register(Box::new(games_total.clone()))?;

        let game_duration = Histogram::with_opts(
            HistogramOpts::new("matchroom_game_duration_seconds", "Duration of one game")
                .buckets(vec![1.0, 10.0, 30.0, 60.0, 300.0, 600.0]),
        )?;
        registry.register(Box::new(game_duration.clone()))?;

        Ok(Self {
            games_total,
            game_duration,
        })
    }
}
