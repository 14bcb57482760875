//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use matchroom::dispatch::{GameOutcome, GameRunner, ResultReporter, RoundReport};
use matchroom::error::{MatchmakingError, Result};
use matchroom::types::{Match, MatchId, Player, RatingRecord, SkipRecord};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Game runner that records every call and can be told to fail some matches
#[derive(Debug, Default)]
pub struct RecordingGameRunner {
    calls: Arc<Mutex<Vec<Match>>>,
    failing: HashSet<MatchId>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl RecordingGameRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the games of these matches
    pub fn failing(mut self, match_ids: &[MatchId]) -> Self {
        self.failing = match_ids.iter().copied().collect();
        self
    }

    /// Make every game take this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Match> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count_for(&self, match_id: MatchId) -> usize {
        self.calls()
            .iter()
            .filter(|m| m.match_id == match_id)
            .count()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameRunner for RecordingGameRunner {
    async fn run_game(&self, game: &Match) -> Result<GameOutcome> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(game.clone());
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&game.match_id) {
            return Err(MatchmakingError::DispatchFailed {
                match_id: game.match_id,
                message: "simulated crash".to_string(),
            }
            .into());
        }

        Ok(GameOutcome {
            match_id: game.match_id,
            player_ids: game.player_ids.clone(),
            payload: serde_json::json!({ "winner": game.player_ids[0] }),
        })
    }
}

/// Reporter that keeps every report in memory
#[derive(Debug, Default)]
pub struct CapturingReporter {
    reports: Mutex<Vec<RoundReport>>,
}

impl CapturingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<RoundReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResultReporter for CapturingReporter {
    async fn report(&self, report: &RoundReport) -> Result<()> {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
        Ok(())
    }
}

/// Create a test player
pub fn create_test_player(id: &str, rating: f64, skip_count: u32) -> Player {
    Player::new(id, rating, skip_count)
}

/// `count` players spaced `spacing` apart starting at `base`
pub fn cluster(prefix: &str, count: usize, base: f64, spacing: f64) -> Vec<Player> {
    (0..count)
        .map(|i| create_test_player(&format!("{}{:02}", prefix, i), base + i as f64 * spacing, 0))
        .collect()
}

/// Split players into the two external record streams
pub fn to_records(players: &[Player]) -> (Vec<RatingRecord>, Vec<SkipRecord>) {
    let ratings = players
        .iter()
        .map(|p| RatingRecord {
            player_id: p.id.clone(),
            rating: p.rating,
        })
        .collect();
    let skips = players
        .iter()
        .map(|p| SkipRecord {
            player_id: p.id.clone(),
            skip_count: p.skip_count,
        })
        .collect();
    (ratings, skips)
}
