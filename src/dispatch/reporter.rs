//! Reporting boundary towards the historical data service

use crate::dispatch::runner::GameOutcome;
use crate::error::{MatchmakingError, Result};
use crate::types::{MatchId, PlayerId, UnmatchedPlayer};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

/// A match whose game could not be run; it is not retried
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFailure {
    pub match_id: MatchId,
    pub player_ids: Vec<PlayerId>,
    pub error: String,
}

/// Everything the historical data service needs from one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    pub run_id: Uuid,
    pub reported_at: DateTime<Utc>,
    pub results: Vec<GameOutcome>,
    pub failures: Vec<GameFailure>,
    /// Updated skip counts for players left out of this round
    pub unmatched: Vec<UnmatchedPlayer>,
}

/// Trait for forwarding round results downstream
#[async_trait]
pub trait ResultReporter: Send + Sync {
    /// Deliver the report for one round
    async fn report(&self, report: &RoundReport) -> Result<()>;
}

/// Writes the round report as JSON for the data service to pick up
#[derive(Debug, Clone)]
pub struct FileResultReporter {
    path: PathBuf,
}

impl FileResultReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultReporter for FileResultReporter {
    async fn report(&self, report: &RoundReport) -> Result<()> {
        let body = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| MatchmakingError::ReportFailed {
                message: format!("{}: {}", self.path.display(), e),
            })?;

        info!(
            "Reported run {} ({} results, {} failures, {} unmatched) to {}",
            report.run_id,
            report.results.len(),
            report.failures.len(),
            report.unmatched.len(),
            self.path.display()
        );
        Ok(())
    }
}
