//! Feedback Store - labeled analysis history
//!
//! The store is externally-owned shared state: feedback submission is the
//! only writer, the calibrator and the demonstration loader only read full
//! snapshots. A record with no label ("no opinion yet") is distinct from an
//! explicit `uncertain` label.

pub mod sqlite;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use sqlite::SqliteFeedbackStore;

/// Authenticity judgment attached to an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Authentic,
    Fake,
    Uncertain,
}

impl Verdict {
    /// True/false for authentic/fake; None for uncertain
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Verdict::Authentic => Some(true),
            Verdict::Fake => Some(false),
            Verdict::Uncertain => None,
        }
    }

    /// The opposite verdict; uncertain stays uncertain
    pub fn negated(&self) -> Verdict {
        match self {
            Verdict::Authentic => Verdict::Fake,
            Verdict::Fake => Verdict::Authentic,
            Verdict::Uncertain => Verdict::Uncertain,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Authentic => "authentic",
            Verdict::Fake => "fake",
            Verdict::Uncertain => "uncertain",
        }
    }

    pub fn parse(s: &str) -> Option<Verdict> {
        match s {
            "authentic" => Some(Verdict::Authentic),
            "fake" => Some(Verdict::Fake),
            "uncertain" => Some(Verdict::Uncertain),
            _ => None,
        }
    }
}

/// User feedback on a completed analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackLabel {
    Correct,
    Incorrect,
    Uncertain,
}

impl FeedbackLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackLabel::Correct => "correct",
            FeedbackLabel::Incorrect => "incorrect",
            FeedbackLabel::Uncertain => "uncertain",
        }
    }

    pub fn parse(s: &str) -> Option<FeedbackLabel> {
        match s {
            "correct" => Some(FeedbackLabel::Correct),
            "incorrect" => Some(FeedbackLabel::Incorrect),
            "uncertain" => Some(FeedbackLabel::Uncertain),
            _ => None,
        }
    }
}

/// One record per completed analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub verdict: Verdict,
    pub confidence: f32,
    pub anomaly_score: f32,
    /// None = no opinion submitted yet
    pub label: Option<FeedbackLabel>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(
        verdict: Verdict,
        confidence: f32,
        anomaly_score: f32,
        label: Option<FeedbackLabel>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            verdict,
            confidence,
            anomaly_score,
            label,
            created_at: Utc::now(),
        }
    }
}

/// Derived ground truth: `correct` confirms the verdict, `incorrect` negates
/// it, anything else carries no signal.
pub fn ground_truth(record: &FeedbackRecord) -> Option<bool> {
    match record.label {
        Some(FeedbackLabel::Correct) => record.verdict.as_bool(),
        Some(FeedbackLabel::Incorrect) => record.verdict.negated().as_bool(),
        _ => None,
    }
}

/// Which labeled records a read should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFilter {
    /// Any record with a label, including `uncertain`
    AnyLabel,
    /// Only records from which ground truth can be derived
    GroundTruthOnly,
}

#[derive(Debug, Error)]
pub enum FeedbackStoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Read/write contract the core sees. Feedback submission (append) is owned
/// by the external layer; the core only reads snapshots.
pub trait FeedbackStore: Send + Sync {
    fn append(&self, record: FeedbackRecord) -> Result<(), FeedbackStoreError>;

    fn list_labeled_records(
        &self,
        filter: LabelFilter,
    ) -> Result<Vec<FeedbackRecord>, FeedbackStoreError>;

    /// Records usable as demonstrations (non-uncertain labels), capped
    fn list_demonstrable_records(
        &self,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>, FeedbackStoreError>;

    fn record_count(&self) -> Result<usize, FeedbackStoreError>;
}

/// In-memory store, used in tests and as the zero-setup default
#[derive(Default)]
pub struct InMemoryFeedbackStore {
    records: parking_lot::RwLock<Vec<FeedbackRecord>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeedbackStore for InMemoryFeedbackStore {
    fn append(&self, record: FeedbackRecord) -> Result<(), FeedbackStoreError> {
        self.records.write().push(record);
        Ok(())
    }

    fn list_labeled_records(
        &self,
        filter: LabelFilter,
    ) -> Result<Vec<FeedbackRecord>, FeedbackStoreError> {
        let records = self.records.read();
        Ok(records
            .iter()
            .filter(|r| match filter {
                LabelFilter::AnyLabel => r.label.is_some(),
                LabelFilter::GroundTruthOnly => ground_truth(r).is_some(),
            })
            .cloned()
            .collect())
    }

    fn list_demonstrable_records(
        &self,
        limit: usize,
    ) -> Result<Vec<FeedbackRecord>, FeedbackStoreError> {
        let records = self.records.read();
        Ok(records
            .iter()
            .filter(|r| {
                matches!(
                    r.label,
                    Some(FeedbackLabel::Correct) | Some(FeedbackLabel::Incorrect)
                )
            })
            .take(limit)
            .cloned()
            .collect())
    }

    fn record_count(&self) -> Result<usize, FeedbackStoreError> {
        Ok(self.records.read().len())
    }
}
