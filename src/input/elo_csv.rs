//! Import a player snapshot from the rating engine's player CSV export
//!
//! The export carries a header row and one line per player. The rating and
//! handle columns are always read. The last-contest timestamp is read only when
//! skip counts are derived from it: a player's skip count is the number of
//! whole rounds between their last contest and the most recent one in the file.

use crate::error::{MatchmakingError, Result};
use crate::types::{RatingRecord, SkipRecord};
use anyhow::Context;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Column positions within the export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EloCsvLayout {
    pub rating_column: usize,
    pub handle_column: usize,
    /// Unix timestamp of the player's last contest
    pub last_contest_column: usize,
}

impl Default for EloCsvLayout {
    fn default() -> Self {
        Self {
            rating_column: 1,
            handle_column: 10,
            last_contest_column: 7,
        }
    }
}

/// Ratings and, when derived, skip counts read from one export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EloSnapshot {
    pub ratings: Vec<RatingRecord>,
    pub skips: Vec<SkipRecord>,
}

/// Parse a snapshot from any reader holding the CSV export
///
/// With `round_seconds` set, every player also gets a skip record counting the
/// rounds of that length since their last contest. Without it the timestamp
/// column is ignored and no skip records are produced.
pub fn read_snapshot<R: Read>(
    reader: R,
    layout: EloCsvLayout,
    round_seconds: Option<u64>,
) -> Result<EloSnapshot> {
    if round_seconds == Some(0) {
        return Err(MatchmakingError::config("round length must be greater than 0 seconds").into());
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut ratings = Vec::new();
    let mut last_contests = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        // Row 1 is the header
        let line = row + 2;
        let record = result.map_err(|e| MatchmakingError::input(format!("line {}: {}", line, e)))?;

        let handle = field(&record, layout.handle_column, "handle", line)?;
        let rating: f64 = parse_field(&record, layout.rating_column, "rating", line)?;
        if round_seconds.is_some() {
            let last_contest: i64 =
                parse_field(&record, layout.last_contest_column, "last contest time", line)?;
            last_contests.push(last_contest);
        }

        ratings.push(RatingRecord {
            player_id: handle.to_string(),
            rating,
        });
    }

    let skips = match (round_seconds, last_contests.iter().max()) {
        (Some(seconds), Some(&latest)) => ratings
            .iter()
            .zip(&last_contests)
            .map(|(player, &last)| SkipRecord {
                player_id: player.player_id.clone(),
                skip_count: rounds_between(last, latest, seconds),
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(EloSnapshot { ratings, skips })
}

/// Load a snapshot from a CSV export on disk
pub fn load_snapshot_csv(
    path: &Path,
    layout: EloCsvLayout,
    round_seconds: Option<u64>,
) -> Result<EloSnapshot> {
    let file =
        std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let snapshot = read_snapshot(file, layout, round_seconds)
        .with_context(|| format!("Rejected {}", path.display()))?;
    debug!(
        "Imported {} ratings and {} skip counts from {}",
        snapshot.ratings.len(),
        snapshot.skips.len(),
        path.display()
    );
    Ok(snapshot)
}

fn field<'r>(record: &'r StringRecord, column: usize, name: &str, line: usize) -> Result<&'r str> {
    record
        .get(column)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            MatchmakingError::input(format!(
                "line {}: missing {} in column {}",
                line, name, column
            ))
            .into()
        })
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    column: usize,
    name: &str,
    line: usize,
) -> Result<T> {
    let raw = field(record, column, name, line)?;
    raw.parse().map_err(|_| {
        MatchmakingError::input(format!("line {}: invalid {} '{}'", line, name, raw)).into()
    })
}

fn rounds_between(last: i64, latest: i64, round_seconds: u64) -> u32 {
    let waited = latest.saturating_sub(last).max(0) as u64;
    u32::try_from(waited / round_seconds).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::classify;

    const HEADER: &str = "rank,rating,mu,sig,perf,catch,num_contests,last_contest_time,prev,delta,handle";

    fn export(rows: &[&str]) -> String {
        let mut data = format!("{}\n", HEADER);
        for row in rows {
            data.push_str(row);
            data.push('\n');
        }
        data
    }

    #[test]
    fn test_reads_default_layout() {
        let data = export(&[
            "1,1823,1800,80,1850,0,12,1700000000,1810,13,alice",
            "2,1510,1500,90,1490,0,4,1690000000,1530,-20,bob",
        ]);

        let snapshot = read_snapshot(data.as_bytes(), EloCsvLayout::default(), None).unwrap();
        assert_eq!(snapshot.ratings.len(), 2);
        assert_eq!(snapshot.ratings[0].player_id, "alice");
        assert_eq!(snapshot.ratings[0].rating, 1823.0);
        assert_eq!(snapshot.ratings[1].player_id, "bob");
        assert!(snapshot.skips.is_empty());
    }

    #[test]
    fn test_skip_counts_from_last_contest_time() {
        let data = export(&[
            "1,1823,1800,80,1850,0,12,1700000000,1810,13,alice",
            "2,1510,1500,90,1490,0,4,1699990000,1530,-20,bob",
            "3,1402,1400,90,1390,0,2,1699996399,1400,2,carol",
        ]);

        let snapshot =
            read_snapshot(data.as_bytes(), EloCsvLayout::default(), Some(3600)).unwrap();
        let skips: Vec<(&str, u32)> = snapshot
            .skips
            .iter()
            .map(|s| (s.player_id.as_str(), s.skip_count))
            .collect();
        // 10000s and 3601s behind the latest contest
        assert_eq!(skips, vec![("alice", 0), ("bob", 2), ("carol", 1)]);
    }

    #[test]
    fn test_bad_last_contest_only_matters_when_used() {
        let data = export(&["1,1823,1800,80,1850,0,12,yesterday,1810,13,alice"]);

        assert!(read_snapshot(data.as_bytes(), EloCsvLayout::default(), None).is_ok());
        let err = read_snapshot(data.as_bytes(), EloCsvLayout::default(), Some(60)).unwrap_err();
        assert!(matches!(
            classify(&err),
            Some(MatchmakingError::InputMalformed { .. })
        ));
        assert!(err.to_string().contains("last contest time"));
    }

    #[test]
    fn test_zero_round_length_is_configuration_invalid() {
        let data = export(&[]);
        let err = read_snapshot(data.as_bytes(), EloCsvLayout::default(), Some(0)).unwrap_err();
        assert!(matches!(
            classify(&err),
            Some(MatchmakingError::ConfigurationInvalid { .. })
        ));
    }

    #[test]
    fn test_short_row_is_input_malformed() {
        let data = export(&["1,1823,1800"]);
        let err = read_snapshot(data.as_bytes(), EloCsvLayout::default(), None).unwrap_err();
        assert!(matches!(
            classify(&err),
            Some(MatchmakingError::InputMalformed { .. })
        ));
    }

    #[test]
    fn test_bad_rating_is_input_malformed() {
        let data = export(&["1,strong,1800,80,1850,0,12,1700000000,1810,13,alice"]);
        let err = read_snapshot(data.as_bytes(), EloCsvLayout::default(), None).unwrap_err();
        assert!(err.to_string().contains("invalid rating"));
    }

    #[test]
    fn test_custom_layout() {
        let data = "handle,rating,seen\ncarol,1402.5,100\ndave,1390,40\n";
        let layout = EloCsvLayout {
            rating_column: 1,
            handle_column: 0,
            last_contest_column: 2,
        };
        let snapshot = read_snapshot(data.as_bytes(), layout, Some(30)).unwrap();
        assert_eq!(snapshot.ratings[0].player_id, "carol");
        assert_eq!(snapshot.ratings[0].rating, 1402.5);
        assert_eq!(snapshot.skips[1].skip_count, 2);
    }
}
