//! Utility functions for the matchmaking engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique run ID for reporting
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: f64, rating2: f64) -> f64 {
    (rating1 - rating2).abs()
}

/// Largest pairwise rating difference in a group (max minus min)
pub fn rating_spread(ratings: impl IntoIterator<Item = f64>) -> f64 {
    let (min, max) = ratings
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r), hi.max(r))
        });
    if min > max {
        0.0
    } else {
        max - min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_run_id();
        let id2 = generate_run_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_rating_difference() {
        assert_eq!(rating_difference(1500.0, 1400.0), 100.0);
        assert_eq!(rating_difference(1400.0, 1500.0), 100.0);
        assert_eq!(rating_difference(1500.0, 1500.0), 0.0);
    }

    #[test]
    fn test_rating_spread() {
        assert_eq!(rating_spread([1500.0, 1400.0, 1620.0]), 220.0);
        assert_eq!(rating_spread([1500.0]), 0.0);
        assert_eq!(rating_spread(std::iter::empty()), 0.0);
    }
}
