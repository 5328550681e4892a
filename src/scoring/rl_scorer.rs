//! RL-aware scoring pipeline
//!
//! Resolves which parameters to score with, in strict preference order:
//! learned policy, then calibrated heuristic, then a neutral placeholder
//! when extraction failed. The pipeline never errors; degradation is
//! reported in the outcome's status and mode.

use image::DynamicImage;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::{RlConfig, SafetyConfig};
use crate::error::AnalysisStatus;
use crate::features::{extract, extract_from_bytes, FeatureReport};
use crate::feedback::FeedbackRecord;
use crate::rl::{RlfdAgent, SnapshotError};
use super::calibrator::calibrate;
use super::params::ScoringParameters;
use super::scorer::{score, ScoreReport};

/// How the scoring parameters were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Learned policy produced the parameters
    Rl,
    /// Calibrated threshold with uniform weights
    Heuristic,
    /// Extraction failed; the report is a placeholder
    Neutral,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: ScoreReport,
    pub params: ScoringParameters,
    pub mode: ScoringMode,
}

/// Scorer holding an optional learned policy behind a lock. The agent is
/// swapped in whole via [`RlScorer::load_policy`]; scoring only ever reads.
pub struct RlScorer {
    agent: RwLock<Option<RlfdAgent>>,
}

impl Default for RlScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RlScorer {
    pub fn new() -> Self {
        Self { agent: RwLock::new(None) }
    }

    pub fn with_agent(agent: RlfdAgent) -> Self {
        Self { agent: RwLock::new(Some(agent)) }
    }

    /// Load a policy snapshot from disk, replacing any current agent
    pub fn load_policy(&self, path: &std::path::Path, config: RlConfig) -> Result<(), SnapshotError> {
        let agent = RlfdAgent::load(path, config)?;
        log::info!(
            "policy loaded: state_dim {}, {} demonstrations",
            agent.state_dim(),
            agent.demonstration_count()
        );
        *self.agent.write() = Some(agent);
        Ok(())
    }

    pub fn has_policy(&self) -> bool {
        self.agent.read().as_ref().map(|a| a.has_policy()).unwrap_or(false)
    }

    /// Score a decoded image against feedback history. Never errors: a
    /// failed extraction yields a neutral outcome with a failed status.
    pub fn analyze(&self, image: &DynamicImage, history: &[FeedbackRecord]) -> AnalysisOutcome {
        self.analyze_report(extract(image), history)
    }

    /// Score raw image bytes
    pub fn analyze_bytes(&self, bytes: &[u8], history: &[FeedbackRecord]) -> AnalysisOutcome {
        self.analyze_report(extract_from_bytes(bytes), history)
    }

    fn analyze_report(&self, extraction: FeatureReport, history: &[FeedbackRecord]) -> AnalysisOutcome {
        if extraction.status.is_failed() {
            let reason = match &extraction.status {
                AnalysisStatus::Failed { reason } => reason.clone(),
                _ => "extraction failed".to_string(),
            };
            return AnalysisOutcome {
                report: ScoreReport::neutral(reason),
                params: ScoringParameters::heuristic(),
                mode: ScoringMode::Neutral,
            };
        }

        let (params, mode) = self.resolve_parameters(&extraction, history);
        let mut report = score(&extraction.vector, &params);
        if mode == ScoringMode::Heuristic && self.has_policy() {
            // A policy exists but was not used (kill-switch); say so
            report.status = AnalysisStatus::degraded("learned policy disabled");
        }

        AnalysisOutcome { report, params, mode }
    }

    fn resolve_parameters(
        &self,
        extraction: &FeatureReport,
        history: &[FeedbackRecord],
    ) -> (ScoringParameters, ScoringMode) {
        if SafetyConfig::is_rl_enabled() {
            let guard = self.agent.read();
            if let Some(agent) = guard.as_ref().filter(|a| a.has_policy()) {
                let action = agent.predict(extraction.vector.as_slice());
                return (ScoringParameters::from_action(&action), ScoringMode::Rl);
            }
        }

        (ScoringParameters::calibrated(calibrate(history)), ScoringMode::Heuristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RlConfig;
    use crate::features::FeatureVector;
    use crate::feedback::{FeedbackLabel, Verdict};
    use crate::rl::ArtworkAuthEnv;
    use crate::scoring::DEFAULT_THRESHOLD;

    fn solid_image() -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(64, 64, image::Rgb([40, 40, 40])))
    }

    fn labeled_history() -> Vec<FeedbackRecord> {
        let mut history = Vec::new();
        for _ in 0..6 {
            history.push(FeedbackRecord::new(
                Verdict::Authentic,
                0.8,
                0.2,
                Some(FeedbackLabel::Correct),
            ));
        }
        for _ in 0..6 {
            history.push(FeedbackRecord::new(
                Verdict::Fake,
                0.8,
                0.8,
                Some(FeedbackLabel::Correct),
            ));
        }
        history
    }

    #[test]
    fn test_no_policy_scores_with_calibrated_heuristic() {
        let scorer = RlScorer::new();
        let outcome = scorer.analyze(&solid_image(), &labeled_history());
        assert_eq!(outcome.mode, ScoringMode::Heuristic);
        assert!((outcome.params.threshold - 0.5).abs() < 1e-6);
        assert!(outcome.report.status.is_ok());
    }

    #[test]
    fn test_sparse_history_uses_default_threshold() {
        let scorer = RlScorer::new();
        let outcome = scorer.analyze(&solid_image(), &[]);
        assert_eq!(outcome.mode, ScoringMode::Heuristic);
        assert_eq!(outcome.params.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_trained_policy_takes_precedence() {
        let features = FeatureVector::from_scores(0.5, 0.5, 0.5, 0.5);
        let mut env = ArtworkAuthEnv::from_features(features, Some(true));
        let mut agent = RlfdAgent::new(4, RlConfig::default());
        agent.seed_heuristic_demonstration(&mut env);
        agent.pretrain();

        let scorer = RlScorer::with_agent(agent);
        assert!(scorer.has_policy());
        let outcome = scorer.analyze(&solid_image(), &labeled_history());
        assert_eq!(outcome.mode, ScoringMode::Rl);
    }

    #[test]
    fn test_unreadable_bytes_yield_neutral_outcome() {
        let scorer = RlScorer::new();
        let outcome = scorer.analyze_bytes(b"not an image", &[]);
        assert_eq!(outcome.mode, ScoringMode::Neutral);
        assert!(outcome.report.status.is_failed());
        assert_eq!(outcome.report.anomaly_score, 0.0);
        assert!(!outcome.report.is_suspicious);
    }
}
