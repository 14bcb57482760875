//! Matchmaking engine configuration

use crate::error::{MatchmakingError, Result};
use serde::{Deserialize, Serialize};

/// Upper bound on window widenings per seed
pub const MAX_WIDENING_STEPS: u32 = 10_000;

/// Tunables for lobby size and the rating window schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchmakingConfig {
    /// Players per match
    pub lobby_size: usize,
    /// Window width (rating units) for the first search around a seed
    pub initial_window: f64,
    /// Amount the window grows by after a failed search
    pub window_step: f64,
    /// Widest window a seed may search with
    pub max_window: f64,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            lobby_size: 5,
            initial_window: 200.0, // ±100 rating points around the seed
            window_step: 100.0,
            max_window: 1000.0,
        }
    }
}

impl MatchmakingConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.lobby_size < 2 {
            return Err(MatchmakingError::config(format!(
                "lobby_size must be at least 2, got {}",
                self.lobby_size
            ))
            .into());
        }

        if !self.initial_window.is_finite() || self.initial_window < 0.0 {
            return Err(MatchmakingError::config(format!(
                "initial_window must be a non-negative number, got {}",
                self.initial_window
            ))
            .into());
        }

        if !self.window_step.is_finite() || self.window_step <= 0.0 {
            return Err(MatchmakingError::config(format!(
                "window_step must be positive, got {}",
                self.window_step
            ))
            .into());
        }

        if !self.max_window.is_finite() || self.max_window < self.initial_window {
            return Err(MatchmakingError::config(format!(
                "max_window ({}) must not be smaller than initial_window ({})",
                self.max_window, self.initial_window
            ))
            .into());
        }

        let widenings = self.widening_steps();
        if widenings > MAX_WIDENING_STEPS as f64 {
            return Err(MatchmakingError::config(format!(
                "window_step {} is too small to go from {} to {} in at most {} steps",
                self.window_step, self.initial_window, self.max_window, MAX_WIDENING_STEPS
            ))
            .into());
        }

        Ok(())
    }

    /// Number of widenings needed to reach `max_window` from `initial_window`
    fn widening_steps(&self) -> f64 {
        ((self.max_window - self.initial_window) / self.window_step).ceil()
    }

    /// Window widths a seed searches with, in order, ending at `max_window`
    pub fn window_schedule(&self) -> impl Iterator<Item = f64> + '_ {
        // Widths are computed from the step index so a step lost to rounding
        // cannot stall the schedule
        let steps = self.widening_steps().clamp(0.0, MAX_WIDENING_STEPS as f64) as u32;
        (0..steps)
            .map(move |k| self.initial_window + k as f64 * self.window_step)
            .take_while(move |&width| width < self.max_window)
            .chain(std::iter::once(self.max_window))
    }
}
