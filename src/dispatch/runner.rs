//! Game execution boundary
//!
//! A game runner takes one match and returns an opaque result payload. The
//! command-based runner hands the match to an external program.

use crate::error::{MatchmakingError, Result};
use crate::types::{Match, MatchId, PlayerId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Result of one finished game; `payload` belongs to the game runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub match_id: MatchId,
    pub player_ids: Vec<PlayerId>,
    pub payload: serde_json::Value,
}

/// Trait for running a single match to completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameRunner: Send + Sync {
    /// Run the game for one match and return its outcome
    async fn run_game(&self, game: &Match) -> Result<GameOutcome>;
}

/// Maximum bytes of stderr quoted in a failure message
const STDERR_TAIL_BYTES: usize = 2048;

/// Runs each game as an external process
///
/// The configured command is invoked with the match's player ids appended as
/// trailing arguments. Standard output is parsed as JSON when possible and
/// kept as a plain string otherwise.
#[derive(Debug, Clone)]
pub struct CommandGameRunner {
    program: String,
    args: Vec<String>,
    game_timeout: Duration,
}

impl CommandGameRunner {
    /// Build a runner from `[program, args...]`
    pub fn new(command: &[String], game_timeout: Duration) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| MatchmakingError::config("game_command must not be empty"))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            game_timeout,
        })
    }
}

#[async_trait]
impl GameRunner for CommandGameRunner {
    async fn run_game(&self, game: &Match) -> Result<GameOutcome> {
        let fail = |message: String| MatchmakingError::DispatchFailed {
            match_id: game.match_id,
            message,
        };

        debug!(
            "Starting game for match {} with players {:?}",
            game.match_id, game.player_ids
        );

        let child = Command::new(&self.program)
            .args(&self.args)
            .args(&game.player_ids)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| fail(format!("failed to spawn '{}': {}", self.program, e)))?;

        let output = match timeout(self.game_timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| fail(format!("failed to collect output: {}", e)))?,
            Err(_) => {
                warn!(
                    "Game for match {} exceeded {:?}, killing it",
                    game.match_id, self.game_timeout
                );
                return Err(fail(format!("timed out after {:?}", self.game_timeout)).into());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
            let tail = stderr.get(start..).unwrap_or(&stderr[..]);
            return Err(fail(format!("exited with {}: {}", output.status, tail.trim())).into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let payload = serde_json::from_str(stdout.trim())
            .unwrap_or_else(|_| serde_json::Value::String(stdout.trim().to_string()));

        info!("Game for match {} finished", game.match_id);
        Ok(GameOutcome {
            match_id: game.match_id,
            player_ids: game.player_ids.clone(),
            payload,
        })
    }
}
