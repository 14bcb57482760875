//! Dispatch of matches to the external game runner and reporting of results
//!
//! This is the surrounding system around the engine: it consumes a manifest,
//! runs each match through a [`GameRunner`] and forwards the round to a
//! [`ResultReporter`].

pub mod dispatcher;
pub mod reporter;
pub mod runner;

// Re-export commonly used types and traits
pub use dispatcher::Dispatcher;
pub use reporter::{FileResultReporter, GameFailure, ResultReporter, RoundReport};
pub use runner::{CommandGameRunner, GameOutcome, GameRunner};
