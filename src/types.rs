//! Common types used throughout the matchmaking engine

use serde::{Deserialize, Serialize};

/// Unique, stable identifier for players
pub type PlayerId = String;

/// Position of a match within its manifest
pub type MatchId = u32;

/// One entry of the rating stream supplied by the external rating engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub player_id: PlayerId,
    pub rating: f64,
}

/// One entry of the skip-count stream supplied by the historical data service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRecord {
    pub player_id: PlayerId,
    pub skip_count: u32,
}

/// Player information for matchmaking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub rating: f64,
    /// Rounds this player was eligible but not placed
    pub skip_count: u32,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, rating: f64, skip_count: u32) -> Self {
        Self {
            id: id.into(),
            rating,
            skip_count,
        }
    }
}

/// A lobby of exactly `lobby_size` players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub match_id: MatchId,
    /// Seed first, then the chosen candidates in selection order
    pub player_ids: Vec<PlayerId>,
    /// Window width the match was formed at
    pub window: f64,
}

/// A player left out of this round, carrying the incremented skip count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedPlayer {
    pub player_id: PlayerId,
    pub skip_count: u32,
}

/// Complete output of one matchmaking run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub matches: Vec<Match>,
    pub unmatched: Vec<UnmatchedPlayer>,
}

impl Manifest {
    /// Total number of players accounted for by this manifest
    pub fn player_count(&self) -> usize {
        self.matches
            .iter()
            .map(|m| m.player_ids.len())
            .sum::<usize>()
            + self.unmatched.len()
    }

    /// Serialize to the canonical JSON document
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Counters describing how a single run went
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub pool_size: usize,
    pub matches_formed: usize,
    pub players_matched: usize,
    pub unmatched: usize,
    pub seeds_tried: usize,
    pub seeds_unplaceable: usize,
    pub widenings: usize,
    /// True when the pool was smaller than one lobby from the start
    pub global_scarcity: bool,
}
