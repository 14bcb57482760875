//! Concurrent dispatch of a manifest's matches
//!
//! Matches are disjoint, so every game can run independently. Concurrency is
//! bounded by a semaphore. A failed game is recorded and never retried.

use crate::dispatch::reporter::{GameFailure, ResultReporter, RoundReport};
use crate::dispatch::runner::{GameOutcome, GameRunner};
use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::types::{Manifest, Match};
use crate::utils::{current_timestamp, generate_run_id};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Runs every match in a manifest and reports the round
pub struct Dispatcher {
    runner: Arc<dyn GameRunner>,
    reporter: Arc<dyn ResultReporter>,
    max_concurrent_games: usize,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Dispatcher {
    pub fn new(
        runner: Arc<dyn GameRunner>,
        reporter: Arc<dyn ResultReporter>,
        max_concurrent_games: usize,
    ) -> Self {
        Self {
            runner,
            reporter,
            max_concurrent_games: max_concurrent_games.max(1),
            metrics: None,
        }
    }

    /// Record game outcomes into the given collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run all games, returning outcomes and failures ordered by match id
    pub async fn run_games(&self, manifest: &Manifest) -> (Vec<GameOutcome>, Vec<GameFailure>) {
        let slots = Arc::new(Semaphore::new(self.max_concurrent_games));
        let mut handles = Vec::with_capacity(manifest.matches.len());

        for game in &manifest.matches {
            let runner = self.runner.clone();
            let slots = slots.clone();
            let task_game = game.clone();

            let handle = tokio::spawn(async move {
                let _permit = slots.acquire_owned().await;
                let started = Instant::now();
                let result = runner.run_game(&task_game).await;
                (result, started.elapsed())
            });
            handles.push((game, handle));
        }

        let mut outcomes = Vec::new();
        let mut failures = Vec::new();

        for (game, handle) in handles {
            match handle.await {
                Ok((Ok(outcome), elapsed)) => {
                    self.record(true, elapsed);
                    outcomes.push(outcome);
                }
                Ok((Err(e), elapsed)) => {
                    warn!("Game for match {} failed: {:#}", game.match_id, e);
                    self.record(false, elapsed);
                    failures.push(failure(game, format!("{:#}", e)));
                }
                Err(join_error) => {
                    error!("Game task for match {} aborted: {}", game.match_id, join_error);
                    self.record(false, Duration::ZERO);
                    failures.push(failure(game, join_error.to_string()));
                }
            }
        }

        (outcomes, failures)
    }

    /// Run all games, then hand the round report to the reporter
    pub async fn dispatch(&self, manifest: &Manifest) -> Result<RoundReport> {
        info!(
            "Dispatching {} matches (up to {} at once)",
            manifest.matches.len(),
            self.max_concurrent_games
        );

        let (results, failures) = self.run_games(manifest).await;
        let report = RoundReport {
            run_id: generate_run_id(),
            reported_at: current_timestamp(),
            results,
            failures,
            unmatched: manifest.unmatched.clone(),
        };

        self.reporter.report(&report).await?;

        info!(
            "Round {} finished: {} games completed, {} failed",
            report.run_id,
            report.results.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn record(&self, success: bool, elapsed: Duration) {
        if let Some(metrics) = &self.metrics {
            metrics.record_game(success, elapsed);
        }
    }
}

fn failure(game: &Match, error: String) -> GameFailure {
    GameFailure {
        match_id: game.match_id,
        player_ids: game.player_ids.clone(),
        error,
    }
}
