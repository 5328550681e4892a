//! Analysis Record - the stored judgment view
//!
//! The persistent analysis row lives outside this core; this is the slice of
//! it the reflexion cycle and the demonstration loader consume, plus the
//! bridge back to a feedback record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::feedback::{FeedbackLabel, FeedbackRecord, Verdict};
use crate::reflexion::types::RevisedJudgment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub verdict: Verdict,
    /// 0.0 to 1.0
    pub confidence: f32,
    pub reasoning: String,
    pub anomaly_score: Option<f32>,
    pub style_analysis: BTreeMap<String, String>,
    pub technique_analysis: BTreeMap<String, String>,
    pub user_feedback: Option<FeedbackLabel>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(verdict: Verdict, confidence: f32, reasoning: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            verdict,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            anomaly_score: None,
            style_analysis: BTreeMap::new(),
            technique_analysis: BTreeMap::new(),
            user_feedback: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_anomaly_score(mut self, score: f32) -> Self {
        self.anomaly_score = Some(score);
        self
    }

    /// Overwrite confidence and reasoning from a promoted revision. The
    /// verdict is carried over by the revision itself and stays in sync.
    pub fn apply_revision(&mut self, revised: &RevisedJudgment) {
        self.verdict = revised.verdict;
        self.confidence = revised.confidence;
        self.reasoning = revised.reasoning.clone();
    }

    /// Project into the feedback store's record shape. Requires an anomaly
    /// score; analyses that never reached the scorer contribute nothing.
    pub fn to_feedback_record(&self) -> Option<FeedbackRecord> {
        let anomaly_score = self.anomaly_score?;
        Some(FeedbackRecord {
            id: self.id.clone(),
            verdict: self.verdict,
            confidence: self.confidence,
            anomaly_score,
            label: self.user_feedback,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        let a = AnalysisRecord::new(Verdict::Authentic, 1.4, "clear brushwork");
        assert_eq!(a.confidence, 1.0);
    }

    #[test]
    fn test_feedback_projection_requires_score() {
        let mut a = AnalysisRecord::new(Verdict::Fake, 0.8, "pigment mismatch");
        assert!(a.to_feedback_record().is_none());

        a.anomaly_score = Some(0.75);
        a.user_feedback = Some(FeedbackLabel::Correct);
        let record = a.to_feedback_record().unwrap();
        assert_eq!(record.verdict, Verdict::Fake);
        assert_eq!(record.label, Some(FeedbackLabel::Correct));
        assert!((record.anomaly_score - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_apply_revision() {
        let mut a = AnalysisRecord::new(Verdict::Authentic, 0.6, "initial pass");
        let revised = RevisedJudgment {
            verdict: Verdict::Authentic,
            confidence: 0.7,
            reasoning: "initial pass\nrefined".to_string(),
            applied_actions: vec!["apply multi-layer verification".to_string()],
        };
        a.apply_revision(&revised);
        assert_eq!(a.confidence, 0.7);
        assert!(a.reasoning.contains("refined"));
    }
}
