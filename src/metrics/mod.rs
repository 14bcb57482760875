//! Metrics for matchmaking runs and game dispatch

pub mod collector;

pub use collector::{DispatchMetrics, EngineMetrics, MetricsCollector, MetricsTimer};
