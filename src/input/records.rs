//! Rating and skip-count record streams
//!
//! Streams are either a JSON array of records or JSON Lines (one record per
//! line). Any record that fails to parse rejects the whole stream.

use crate::error::{MatchmakingError, Result};
use crate::types::{RatingRecord, SkipRecord};
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// On-disk layout of a record stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    JsonArray,
    JsonLines,
}

impl RecordFormat {
    /// Guess the layout from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") | Some("ndjson") => RecordFormat::JsonLines,
            _ => RecordFormat::JsonArray,
        }
    }
}

/// Parse a record stream held in memory
pub fn parse_records<T: DeserializeOwned>(raw: &str, format: RecordFormat) -> Result<Vec<T>> {
    match format {
        RecordFormat::JsonArray => serde_json::from_str::<Vec<T>>(raw).map_err(|e| {
            MatchmakingError::input(format!("invalid record array: {}", e)).into()
        }),
        RecordFormat::JsonLines => {
            let mut records = Vec::new();
            for (n, line) in raw.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let record = serde_json::from_str::<T>(line)
                    .map_err(|e| MatchmakingError::input(format!("line {}: {}", n + 1, e)))?;
                records.push(record);
            }
            Ok(records)
        }
    }
}

/// Read a record stream from disk
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<T> = parse_records(&raw, RecordFormat::from_path(path))
        .with_context(|| format!("Rejected {}", path.display()))?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load the rating stream
pub fn load_ratings(path: &Path) -> Result<Vec<RatingRecord>> {
    load_records(path)
}

/// Load the skip-count stream
pub fn load_skip_counts(path: &Path) -> Result<Vec<SkipRecord>> {
    load_records(path)
}
