//! Matchmaking engine
//!
//! Pure, deterministic partitioning of a rated player pool into fixed-size
//! lobbies. No I/O happens in here; loading, writing and dispatch live in their
//! own modules.

pub mod matcher;
pub mod pool;
pub mod priority;
pub mod verify;
pub mod window;

// Re-export commonly used types
pub use matcher::{match_players, MatchOutcome, MatchmakingEngine};
pub use pool::Pool;
pub use priority::{compare_candidates, compare_seeds, seed_order};
pub use window::RatingIndex;
