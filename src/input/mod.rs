//! Loading of the external rating and skip-count streams

pub mod elo_csv;
pub mod records;

pub use elo_csv::{load_snapshot_csv, read_snapshot, EloCsvLayout, EloSnapshot};
pub use records::{load_ratings, load_records, load_skip_counts, parse_records, RecordFormat};
