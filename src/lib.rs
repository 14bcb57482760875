//! Matchroom - batch matchmaking for fixed-size game lobbies
//!
//! This crate partitions a snapshot of rated players into disjoint lobbies,
//! favouring players who have been skipped the longest, and provides the
//! plumbing around it: record loading, manifest writing, game dispatch and
//! result reporting.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod input;
pub mod manifest;
pub mod metrics;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{MatchmakingError, Result};
pub use types::*;

// Re-export key components
pub use config::MatchmakingConfig;
pub use engine::{match_players, MatchOutcome, MatchmakingEngine, Pool};
pub use manifest::{JsonManifestWriter, ManifestWriter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
