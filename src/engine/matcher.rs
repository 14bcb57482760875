//! Seed-and-window matchmaking pass
//!
//! One run walks the pool in seed priority order. Each seed searches a rating
//! window that widens step by step until enough candidates are found or the
//! maximum width is exhausted. Players who end the pass unplaced get their skip
//! count incremented.

use crate::config::MatchmakingConfig;
use crate::engine::pool::Pool;
use crate::engine::priority::seed_order;
use crate::engine::window::{select_closest, RatingIndex};
use crate::error::Result;
use crate::types::{Manifest, Match, MatchId, Player, RunSummary, UnmatchedPlayer};
use tracing::{debug, info};

/// Manifest plus the counters gathered while producing it
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub manifest: Manifest,
    pub summary: RunSummary,
}

/// Deterministic, single-threaded lobby builder
#[derive(Debug, Clone)]
pub struct MatchmakingEngine {
    config: MatchmakingConfig,
}

/// A group found for a seed: members in selection order and the window used
struct FormedGroup {
    members: Vec<usize>,
    window: f64,
}

impl MatchmakingEngine {
    /// Create an engine, rejecting invalid configuration up front
    pub fn new(config: MatchmakingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Partition the pool into matches and unmatched players
    ///
    /// The pool is not modified; the run works on its own bookkeeping.
    pub fn run(&self, pool: &Pool) -> MatchOutcome {
        let players = pool.players();
        let lobby_size = self.config.lobby_size;

        let mut summary = RunSummary {
            pool_size: players.len(),
            ..Default::default()
        };
        let order = seed_order(players);
        let mut consumed = vec![false; players.len()];
        let mut remaining = players.len();
        let mut matches = Vec::new();

        if remaining < lobby_size {
            summary.global_scarcity = true;
            if remaining > 0 {
                info!(
                    "Only {} player(s) in pool, lobby size is {}; nobody is matched this round",
                    remaining, lobby_size
                );
            }
        } else {
            let index = RatingIndex::new(players);

            for &seed in &order {
                if remaining < lobby_size {
                    break;
                }
                if consumed[seed] {
                    continue;
                }

                summary.seeds_tried += 1;
                match self.form_group(players, &index, &consumed, seed, &mut summary) {
                    Some(group) => {
                        for &member in &group.members {
                            consumed[member] = true;
                        }
                        remaining -= group.members.len();

                        let match_id = matches.len() as MatchId;
                        debug!(
                            "Match {} formed around seed '{}' at window {}",
                            match_id, players[seed].id, group.window
                        );
                        matches.push(Match {
                            match_id,
                            player_ids: group
                                .members
                                .iter()
                                .map(|&i| players[i].id.clone())
                                .collect(),
                            window: group.window,
                        });
                    }
                    None => {
                        summary.seeds_unplaceable += 1;
                        debug!(
                            "Seed '{}' (rating {}, skipped {}) is unplaceable this round",
                            players[seed].id, players[seed].rating, players[seed].skip_count
                        );
                    }
                }
            }
        }

        let unmatched: Vec<UnmatchedPlayer> = order
            .iter()
            .filter(|&&i| !consumed[i])
            .map(|&i| UnmatchedPlayer {
                player_id: players[i].id.clone(),
                skip_count: players[i].skip_count.saturating_add(1),
            })
            .collect();

        summary.matches_formed = matches.len();
        summary.players_matched = matches.len() * lobby_size;
        summary.unmatched = unmatched.len();

        info!(
            "Matchmaking run complete: {} players, {} matches, {} unmatched, {} unplaceable seeds, {} widenings",
            summary.pool_size,
            summary.matches_formed,
            summary.unmatched,
            summary.seeds_unplaceable,
            summary.widenings
        );

        MatchOutcome {
            manifest: Manifest { matches, unmatched },
            summary,
        }
    }

    /// Search widening windows around `seed` until a full lobby fits
    fn form_group(
        &self,
        players: &[Player],
        index: &RatingIndex,
        consumed: &[bool],
        seed: usize,
        summary: &mut RunSummary,
    ) -> Option<FormedGroup> {
        let needed = self.config.lobby_size - 1;

        for (attempt, width) in self.config.window_schedule().enumerate() {
            if attempt > 0 {
                summary.widenings += 1;
            }

            let candidates = index.candidates(players, consumed, seed, width);
            if candidates.len() >= needed {
                let mut members = Vec::with_capacity(needed + 1);
                members.push(seed);
                members.extend(select_closest(players, seed, candidates, needed));
                return Some(FormedGroup {
                    members,
                    window: width,
                });
            }
        }

        None
    }
}

/// Run the engine once over a plain player list
pub fn match_players(players: &[Player], config: &MatchmakingConfig) -> Result<Manifest> {
    let engine = MatchmakingEngine::new(config.clone())?;
    let pool = Pool::new(players.to_vec())?;
    Ok(engine.run(&pool).manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{classify, MatchmakingError};
    use crate::utils::rating_spread;
    use std::collections::HashMap;

    fn create_test_player(id: &str, rating: f64, skip_count: u32) -> Player {
        Player::new(id, rating, skip_count)
    }

    fn engine() -> MatchmakingEngine {
        MatchmakingEngine::new(MatchmakingConfig::default()).unwrap()
    }

    fn pool(players: Vec<Player>) -> Pool {
        Pool::new(players).unwrap()
    }

    #[test]
    fn test_empty_pool() {
        let outcome = engine().run(&Pool::default());
        assert!(outcome.manifest.matches.is_empty());
        assert!(outcome.manifest.unmatched.is_empty());
    }

    #[test]
    fn test_global_scarcity_four_players() {
        let players = vec![
            create_test_player("a", 1500.0, 0),
            create_test_player("b", 1500.0, 2),
            create_test_player("c", 900.0, 0),
            create_test_player("d", 2400.0, 1),
        ];
        let outcome = engine().run(&pool(players.clone()));

        assert!(outcome.manifest.matches.is_empty());
        assert!(outcome.summary.global_scarcity);
        assert_eq!(outcome.manifest.unmatched.len(), 4);
        for p in &players {
            let entry = outcome
                .manifest
                .unmatched
                .iter()
                .find(|u| u.player_id == p.id)
                .unwrap();
            assert_eq!(entry.skip_count, p.skip_count + 1);
        }
    }

    #[test]
    fn test_five_close_players_form_one_match() {
        let players: Vec<Player> = (0..5)
            .map(|i| create_test_player(&format!("p{}", i), 1500.0 + i as f64 * 10.0, 0))
            .collect();
        let outcome = engine().run(&pool(players));

        assert_eq!(outcome.manifest.matches.len(), 1);
        assert_eq!(outcome.manifest.matches[0].player_ids.len(), 5);
        assert!(outcome.manifest.unmatched.is_empty());
        // Lowest rating seeds first when nobody has waited
        assert_eq!(outcome.manifest.matches[0].player_ids[0], "p0");
    }

    #[test]
    fn test_cluster_with_far_outliers() {
        let mut players: Vec<Player> = (0..10)
            .map(|i| create_test_player(&format!("c{}", i), 1500.0 + i as f64 * 5.0, 0))
            .collect();
        players.push(create_test_player("low_outlier", 100.0, 3));
        players.push(create_test_player("high_outlier", 3500.0, 3));

        let outcome = engine().run(&pool(players));

        assert_eq!(outcome.manifest.matches.len(), 2);
        let unmatched: Vec<&str> = outcome
            .manifest
            .unmatched
            .iter()
            .map(|u| u.player_id.as_str())
            .collect();
        assert_eq!(unmatched, vec!["low_outlier", "high_outlier"]);
        assert!(outcome.manifest.unmatched.iter().all(|u| u.skip_count == 4));
        assert_eq!(outcome.summary.seeds_unplaceable, 2);
    }

    #[test]
    fn test_window_widens_until_lobby_fits() {
        let players = vec![
            create_test_player("s", 1500.0, 5),
            create_test_player("a", 1540.0, 0),
            create_test_player("b", 1460.0, 0),
            create_test_player("c", 1650.0, 0),
            create_test_player("d", 1340.0, 0),
        ];
        let outcome = engine().run(&pool(players));

        assert_eq!(outcome.manifest.matches.len(), 1);
        let formed = &outcome.manifest.matches[0];
        // c and d are 150 and 160 away: needs width 400
        assert_eq!(formed.window, 400.0);
        assert_eq!(outcome.summary.widenings, 2);
        assert_eq!(formed.player_ids[0], "s");
    }

    #[test]
    fn test_match_respects_window() {
        let players: Vec<Player> = (0..23)
            .map(|i| create_test_player(&format!("p{}", i), 1000.0 + (i * 37 % 500) as f64, i % 3))
            .collect();
        let by_id: HashMap<_, _> = players.iter().map(|p| (p.id.clone(), p.rating)).collect();

        let outcome = engine().run(&pool(players));
        for m in &outcome.manifest.matches {
            let spread = rating_spread(m.player_ids.iter().map(|id| by_id[id]));
            assert!(spread <= m.window);
        }
    }

    #[test]
    fn test_long_waiter_seeds_first() {
        // Six equal players: only one lobby fits, the waiter must be in it
        let players = vec![
            create_test_player("a", 1500.0, 0),
            create_test_player("b", 1500.0, 0),
            create_test_player("c", 1500.0, 0),
            create_test_player("d", 1500.0, 0),
            create_test_player("e", 1500.0, 0),
            create_test_player("waiter", 1500.0, 1),
        ];
        let outcome = engine().run(&pool(players));

        assert_eq!(outcome.manifest.matches.len(), 1);
        assert_eq!(outcome.manifest.matches[0].player_ids[0], "waiter");
        assert_eq!(outcome.manifest.unmatched.len(), 1);
        assert_eq!(outcome.manifest.unmatched[0].player_id, "e");
        assert_eq!(outcome.manifest.unmatched[0].skip_count, 1);
    }

    #[test]
    fn test_local_scarcity_leaves_candidates_for_next_seed() {
        // The waiter at 2000 cannot fill a lobby even at max width, but
        // everyone it considered is still available to the next seed.
        let config = MatchmakingConfig {
            lobby_size: 3,
            initial_window: 200.0,
            window_step: 100.0,
            max_window: 200.0,
        };
        let engine = MatchmakingEngine::new(config).unwrap();
        let players = vec![
            create_test_player("waiter", 2000.0, 9),
            create_test_player("x", 1900.0, 0),
            create_test_player("y", 1850.0, 0),
            create_test_player("z", 1820.0, 0),
        ];
        let outcome = engine.run(&pool(players));

        assert_eq!(outcome.manifest.matches.len(), 1);
        assert_eq!(outcome.manifest.matches[0].player_ids, vec!["z", "y", "x"]);
        assert_eq!(outcome.manifest.unmatched[0].player_id, "waiter");
        assert_eq!(outcome.manifest.unmatched[0].skip_count, 10);
    }

    #[test]
    fn test_deterministic_output() {
        let players: Vec<Player> = (0..40)
            .map(|i| create_test_player(&format!("p{:02}", i), 1200.0 + (i * 53 % 700) as f64, i % 4))
            .collect();
        let pool = pool(players);

        let first = engine().run(&pool).manifest.to_json().unwrap();
        let second = engine().run(&pool).manifest.to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = MatchmakingEngine::new(MatchmakingConfig {
            lobby_size: 1,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(
            classify(&err),
            Some(MatchmakingError::ConfigurationInvalid { .. })
        ));
    }

    #[test]
    fn test_stalling_window_step_rejected() {
        let err = MatchmakingEngine::new(MatchmakingConfig {
            lobby_size: 5,
            initial_window: 1e17,
            window_step: 1.0,
            max_window: 2e17,
        })
        .unwrap_err();
        assert!(matches!(
            classify(&err),
            Some(MatchmakingError::ConfigurationInvalid { .. })
        ));
    }

    #[test]
    fn test_fine_grained_schedule_terminates_on_unplaceable_seeds() {
        let config = MatchmakingConfig {
            lobby_size: 3,
            initial_window: 0.0,
            window_step: 0.1,
            max_window: 1000.0,
        };
        let engine = MatchmakingEngine::new(config).unwrap();
        // Every player is 5000 apart: each seed walks the whole schedule
        let players: Vec<Player> = (0..4)
            .map(|i| create_test_player(&format!("p{}", i), i as f64 * 5000.0, 0))
            .collect();

        let outcome = engine.run(&pool(players));
        assert!(outcome.manifest.matches.is_empty());
        assert_eq!(outcome.summary.seeds_unplaceable, 4);
        assert_eq!(outcome.manifest.unmatched.len(), 4);
    }

    #[test]
    fn test_match_players_rejects_duplicates() {
        let players = vec![
            create_test_player("dup", 1500.0, 0),
            create_test_player("dup", 1600.0, 0),
        ];
        let err = match_players(&players, &MatchmakingConfig::default()).unwrap_err();
        assert!(matches!(
            classify(&err),
            Some(MatchmakingError::InputMalformed { .. })
        ));
    }
}
