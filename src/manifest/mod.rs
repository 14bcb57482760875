//! Match manifest output

pub mod writer;

pub use writer::{read_manifest, JsonManifestWriter, ManifestWriter};
