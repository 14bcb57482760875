//! Fairness ordering for seeds and candidates
//!
//! Long-waiting players go first as seeds and win distance ties as candidates.
//! Every comparison ends on the player id so the order is total and runs are
//! reproducible.

use crate::types::Player;
use crate::utils::rating_difference;
use std::cmp::Ordering;

/// Seed priority: skip count descending, rating ascending, id ascending
pub fn compare_seeds(a: &Player, b: &Player) -> Ordering {
    b.skip_count
        .cmp(&a.skip_count)
        .then_with(|| a.rating.total_cmp(&b.rating))
        .then_with(|| a.id.cmp(&b.id))
}

/// Indices of `players` in the order they are tried as seeds
pub fn seed_order(players: &[Player]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..players.len()).collect();
    order.sort_by(|&a, &b| compare_seeds(&players[a], &players[b]));
    order
}

/// Candidate preference relative to `seed`: closer rating first, then longer
/// wait, then lower rating, then id
pub fn compare_candidates(seed: &Player, a: &Player, b: &Player) -> Ordering {
    let da = rating_difference(a.rating, seed.rating);
    let db = rating_difference(b.rating, seed.rating);
    da.total_cmp(&db)
        .then_with(|| b.skip_count.cmp(&a.skip_count))
        .then_with(|| a.rating.total_cmp(&b.rating))
        .then_with(|| a.id.cmp(&b.id))
}
