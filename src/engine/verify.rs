//! Consistency checks for a manifest against the pool it came from

use crate::engine::pool::Pool;
use crate::error::{MatchmakingError, Result};
use crate::types::Manifest;
use crate::utils::rating_spread;
use std::collections::{HashMap, HashSet};

/// Relative slack for rounding in the window bounds
const WINDOW_SLACK: f64 = 1e-9;

impl Manifest {
    /// Check that every pool player appears exactly once, that every match has
    /// exactly `lobby_size` players within its window and that unmatched skip
    /// counts were bumped
    pub fn verify(&self, pool: &Pool, lobby_size: usize) -> Result<()> {
        if self.player_count() != pool.len() {
            return Err(inconsistent(format!(
                "manifest accounts for {} of {} players",
                self.player_count(),
                pool.len()
            )));
        }

        let known: HashMap<&str, (f64, u32)> = pool
            .players()
            .iter()
            .map(|p| (p.id.as_str(), (p.rating, p.skip_count)))
            .collect();
        let mut seen: HashSet<&str> = HashSet::with_capacity(pool.len());

        for m in &self.matches {
            if m.player_ids.len() != lobby_size {
                return Err(inconsistent(format!(
                    "match {} has {} players, expected {}",
                    m.match_id,
                    m.player_ids.len(),
                    lobby_size
                )));
            }
            let mut ratings = Vec::with_capacity(lobby_size);
            for id in &m.player_ids {
                let Some(&(rating, _)) = known.get(id.as_str()) else {
                    return Err(inconsistent(format!(
                        "match {} contains unknown player '{}'",
                        m.match_id, id
                    )));
                };
                if !seen.insert(id.as_str()) {
                    return Err(inconsistent(format!("player '{}' placed twice", id)));
                }
                ratings.push(rating);
            }
            let spread = rating_spread(ratings);
            if spread - m.window > WINDOW_SLACK * m.window.max(1.0) {
                return Err(inconsistent(format!(
                    "match {} spans {} rating points, wider than its window {}",
                    m.match_id, spread, m.window
                )));
            }
        }

        for entry in &self.unmatched {
            let Some(&(_, previous)) = known.get(entry.player_id.as_str()) else {
                return Err(inconsistent(format!(
                    "unmatched list contains unknown player '{}'",
                    entry.player_id
                )));
            };
            if !seen.insert(entry.player_id.as_str()) {
                return Err(inconsistent(format!(
                    "player '{}' is both placed and unmatched",
                    entry.player_id
                )));
            }
            if entry.skip_count != previous.saturating_add(1) {
                return Err(inconsistent(format!(
                    "player '{}' skip count {} was not incremented from {}",
                    entry.player_id, entry.skip_count, previous
                )));
            }
        }

        Ok(())
    }
}

fn inconsistent(message: String) -> anyhow::Error {
    MatchmakingError::InternalError { message }.into()
}
