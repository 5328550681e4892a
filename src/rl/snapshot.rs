//! Versioned policy snapshots
//!
//! A snapshot pairs the trained networks with the demonstrations they were
//! trained against; loading one without the other would silently change the
//! policy's behavior, so an unpaired file is rejected outright. Writes go
//! through a temp file and an atomic rename.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::net::Mlp;
use super::replay::Demonstration;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
    #[error("snapshot version {found} is not supported (expected {SNAPSHOT_VERSION})")]
    VersionMismatch { found: u32 },
    #[error("snapshot pairs a policy with its demonstrations; refusing one without the other")]
    UnpairedSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub version: u32,
    pub state_dim: usize,
    pub actor: Option<Mlp>,
    pub critic: Option<Mlp>,
    pub demonstrations: Vec<Demonstration>,
    pub saved_at: DateTime<Utc>,
}

impl PolicySnapshot {
    /// Enforce the pairing rule: a trained policy must travel with the
    /// demonstrations behind it, and demonstrations alone are not a policy.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch { found: self.version });
        }
        if self.actor.is_some() != !self.demonstrations.is_empty() {
            return Err(SnapshotError::UnpairedSnapshot);
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec(self)?)?;
        fs::rename(&tmp, path)?;
        log::info!(
            "policy snapshot written to {} ({} demonstrations)",
            path.display(),
            self.demonstrations.len()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = fs::read(path)?;
        let snapshot: PolicySnapshot = serde_json::from_slice(&bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}
