//! Manifest persistence
//!
//! Manifests are written to a sibling temp file and renamed into place, so
//! readers only ever see a complete document.

use crate::error::{MatchmakingError, Result};
use crate::types::Manifest;
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Trait for persisting manifests for downstream consumers
pub trait ManifestWriter: Send + Sync {
    /// Persist a complete manifest
    fn write_manifest(&self, manifest: &Manifest) -> Result<()>;
}

/// Writes the manifest as pretty-printed JSON to a fixed path
#[derive(Debug, Clone)]
pub struct JsonManifestWriter {
    path: PathBuf,
}

impl JsonManifestWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "manifest.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ManifestWriter for JsonManifestWriter {
    fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        let body = manifest.to_json()?;
        let tmp = self.temp_path();

        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(body.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
            std::fs::rename(&tmp, &self.path)
        };

        if let Err(e) = write() {
            let _ = std::fs::remove_file(&tmp);
            return Err(MatchmakingError::ManifestWriteFailed {
                message: format!("{}: {}", self.path.display(), e),
            }
            .into());
        }

        info!(
            "Wrote manifest with {} matches and {} unmatched players to {}",
            manifest.matches.len(),
            manifest.unmatched.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Load a previously written manifest
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_json::from_str(&raw).map_err(|e| {
        MatchmakingError::input(format!("manifest {}: {}", path.display(), e)).into()
    })
}
