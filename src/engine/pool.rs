//! Validated player pool for a single matchmaking run

use crate::error::{MatchmakingError, Result};
use crate::types::{Player, PlayerId, RatingRecord, SkipRecord};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// The set of players eligible for one round
///
/// Construction rejects duplicate identifiers, empty identifiers and
/// non-finite ratings, so the engine never has to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pool {
    players: Vec<Player>,
}

impl Pool {
    /// Build a pool from already-joined players
    pub fn new(players: Vec<Player>) -> Result<Self> {
        validate_players(&players)?;
        Ok(Self { players })
    }

    /// Join the rating stream with the skip-count stream
    ///
    /// Every rated player is eligible. A rated player with no skip record starts
    /// at zero; skip records for unrated players are dropped.
    pub fn from_records(ratings: Vec<RatingRecord>, skips: Vec<SkipRecord>) -> Result<Self> {
        let mut skip_counts: HashMap<PlayerId, u32> = HashMap::with_capacity(skips.len());
        for record in skips {
            if record.player_id.is_empty() {
                return Err(MatchmakingError::input("skip record with empty playerId").into());
            }
            if skip_counts.contains_key(&record.player_id) {
                return Err(MatchmakingError::input(format!(
                    "duplicate playerId '{}' in skip counts",
                    record.player_id
                ))
                .into());
            }
            skip_counts.insert(record.player_id, record.skip_count);
        }

        let mut players = Vec::with_capacity(ratings.len());
        for record in ratings {
            let skip_count = skip_counts.remove(&record.player_id).unwrap_or(0);
            players.push(Player {
                id: record.player_id,
                rating: record.rating,
                skip_count,
            });
        }

        if !skip_counts.is_empty() {
            let mut orphans: Vec<_> = skip_counts.into_keys().collect();
            orphans.sort();
            warn!(
                "Ignoring {} skip count(s) for players without a rating: {:?}",
                orphans.len(),
                orphans
            );
        }

        let pool = Self::new(players)?;
        debug!("Built pool of {} players", pool.len());
        Ok(pool)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

}

fn validate_players(players: &[Player]) -> Result<()> {
    let mut seen = HashSet::with_capacity(players.len());

    for player in players {
        if player.id.is_empty() {
            return Err(MatchmakingError::input("player with empty playerId").into());
        }
        if !player.rating.is_finite() {
            return Err(MatchmakingError::input(format!(
                "player '{}' has non-finite rating {}",
                player.id, player.rating
            ))
            .into());
        }
        if !seen.insert(player.id.as_str()) {
            return Err(MatchmakingError::input(format!("duplicate playerId '{}'", player.id)).into());
        }
    }

    Ok(())
}
