//! Error handling
//!
//! The analysis path never throws across the crate boundary: degraded and
//! failed states travel as [`AnalysisStatus`] values inside result payloads.
//! Real errors (storage, snapshots, the judge) are typed enums owned by the
//! module that produces them and re-exported here.

use serde::{Deserialize, Serialize};

pub use crate::feedback::FeedbackStoreError;
pub use crate::judge::JudgeError;
pub use crate::rl::snapshot::SnapshotError;

/// Outcome state attached to every analysis payload.
///
/// `Degraded` means a fallback was taken but the result is usable;
/// `Failed` means the result is a neutral placeholder and should not be
/// treated as a judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalysisStatus {
    Ok,
    Degraded { reason: String },
    Failed { reason: String },
}

impl AnalysisStatus {
    pub fn degraded(reason: impl Into<String>) -> Self {
        AnalysisStatus::Degraded { reason: reason.into() }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        AnalysisStatus::Failed { reason: reason.into() }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AnalysisStatus::Ok)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AnalysisStatus::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(AnalysisStatus::Ok.is_ok());
        assert!(!AnalysisStatus::Ok.is_failed());
        assert!(AnalysisStatus::failed("unreadable image").is_failed());
        assert!(!AnalysisStatus::degraded("heuristic parameters").is_ok());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(AnalysisStatus::degraded("no policy")).unwrap();
        assert_eq!(json["state"], "degraded");
        assert_eq!(json["reason"], "no policy");
    }
}
