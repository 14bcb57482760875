//! Rating-window candidate search
//!
//! Players are indexed once by rating so each search is a pair of binary
//! searches plus a scan of the players inside the window.

use crate::engine::priority::compare_candidates;
use crate::types::Player;

/// Player indices sorted by rating (ties by id)
#[derive(Debug)]
pub struct RatingIndex {
    sorted: Vec<usize>,
}

impl RatingIndex {
    pub fn new(players: &[Player]) -> Self {
        let mut sorted: Vec<usize> = (0..players.len()).collect();
        sorted.sort_by(|&a, &b| {
            players[a]
                .rating
                .total_cmp(&players[b].rating)
                .then_with(|| players[a].id.cmp(&players[b].id))
        });
        Self { sorted }
    }

    /// Unconsumed players other than `seed` within `width / 2` of the seed's rating
    ///
    /// A window of width `W` is centred on the seed, so any two players it
    /// admits differ by at most `W`.
    pub fn candidates(
        &self,
        players: &[Player],
        consumed: &[bool],
        seed: usize,
        width: f64,
    ) -> Vec<usize> {
        let center = players[seed].rating;
        let half = width / 2.0;

        // `rating - center` is monotone in rating, so both bounds are partition points
        let lo = self
            .sorted
            .partition_point(|&i| players[i].rating - center < -half);
        let hi = self
            .sorted
            .partition_point(|&i| players[i].rating - center <= half);

        self.sorted[lo..hi.max(lo)]
            .iter()
            .copied()
            .filter(|&i| i != seed && !consumed[i])
            .collect()
    }
}

/// Pick the `needed` most preferred candidates for `seed`, best first
pub fn select_closest(
    players: &[Player],
    seed: usize,
    mut candidates: Vec<usize>,
    needed: usize,
) -> Vec<usize> {
    let seed_player = &players[seed];
    candidates.sort_by(|&a, &b| compare_candidates(seed_player, &players[a], &players[b]));
    candidates.truncate(needed);
    candidates
}
