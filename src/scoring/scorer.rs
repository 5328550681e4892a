//! Anomaly Scorer
//!
//! Deterministic weighted combination of the four signals. Warning flags are
//! human-readable diagnostics only - they never affect the verdict.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisStatus;
use crate::features::{FeatureVector, FEATURE_COUNT};
use super::params::ScoringParameters;

/// Per-signal score above this raises a warning flag
pub const FLAG_THRESHOLD: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningFlag {
    Texture,
    Edge,
    Color,
    Noise,
}

impl WarningFlag {
    pub fn label(&self) -> &'static str {
        match self {
            WarningFlag::Texture => "UNNATURAL_TEXTURE",
            WarningFlag::Edge => "SUSPICIOUS_EDGES",
            WarningFlag::Color => "UNNATURAL_COLOR_DISTRIBUTION",
            WarningFlag::Noise => "ARTIFICIAL_NOISE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WarningFlag::Texture => "Texture pattern is anomalously smooth",
            WarningFlag::Edge => "Edge density is outside the natural range",
            WarningFlag::Color => "Color distribution looks unnatural",
            WarningFlag::Noise => "Noise pattern suggests artificial generation",
        }
    }
}

/// Per-signal breakdown persisted with the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBreakdown {
    pub texture_anomaly: f32,
    pub edge_anomaly: f32,
    pub color_anomaly: f32,
    pub noise_anomaly: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub anomaly_score: f32,
    pub is_suspicious: bool,
    pub threshold: f32,
    pub weights: [f32; FEATURE_COUNT],
    pub details: SignalBreakdown,
    pub flags: Vec<WarningFlag>,
    pub status: AnalysisStatus,
}

impl ScoreReport {
    /// Placeholder for a failed analysis: zero score, never suspicious
    pub fn neutral(reason: impl Into<String>) -> Self {
        Self {
            anomaly_score: 0.0,
            is_suspicious: false,
            threshold: ScoringParameters::heuristic().threshold,
            weights: ScoringParameters::heuristic().normalized_weights(),
            details: SignalBreakdown {
                texture_anomaly: 0.0,
                edge_anomaly: 0.0,
                color_anomaly: 0.0,
                noise_anomaly: 0.0,
            },
            flags: Vec::new(),
            status: AnalysisStatus::failed(reason),
        }
    }
}

/// Score a feature vector against a parameter snapshot.
///
/// `anomaly_score = dot(features, normalized_weights)`; suspicious when the
/// score strictly exceeds the threshold.
pub fn score(features: &FeatureVector, params: &ScoringParameters) -> ScoreReport {
    let weights = params.normalized_weights();
    let threshold = params.threshold.clamp(0.0, 1.0);

    let anomaly_score: f32 = features
        .as_slice()
        .iter()
        .zip(weights.iter())
        .map(|(f, w)| f.clamp(0.0, 1.0) * w)
        .sum();

    ScoreReport {
        anomaly_score,
        is_suspicious: anomaly_score > threshold,
        threshold,
        weights,
        details: SignalBreakdown {
            texture_anomaly: features.texture(),
            edge_anomaly: features.edge(),
            color_anomaly: features.color(),
            noise_anomaly: features.noise(),
        },
        flags: generate_flags(features),
        status: AnalysisStatus::Ok,
    }
}

fn generate_flags(features: &FeatureVector) -> Vec<WarningFlag> {
    let mut flags = Vec::new();
    if features.texture() > FLAG_THRESHOLD {
        flags.push(WarningFlag::Texture);
    }
    if features.edge() > FLAG_THRESHOLD {
        flags.push(WarningFlag::Edge);
    }
    if features.color() > FLAG_THRESHOLD {
        flags.push(WarningFlag::Color);
    }
    if features.noise() > FLAG_THRESHOLD {
        flags.push(WarningFlag::Noise);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_scoring() {
        let features = FeatureVector::from_scores(0.2, 0.2, 0.2, 0.2);
        let params = ScoringParameters {
            threshold: 0.3,
            weights: [0.25; 4],
        };
        let report = score(&features, &params);
        assert!((report.anomaly_score - 0.2).abs() < 1e-6);
        assert!(!report.is_suspicious);
        assert!(report.status.is_ok());
    }

    #[test]
    fn test_suspicious_above_threshold() {
        let features = FeatureVector::from_scores(0.9, 0.9, 0.9, 0.9);
        let report = score(&features, &ScoringParameters::heuristic());
        assert!(report.is_suspicious);
    }

    #[test]
    fn test_zero_weights_do_not_divide_by_zero() {
        let features = FeatureVector::from_scores(0.4, 0.4, 0.4, 0.4);
        let params = ScoringParameters {
            threshold: 0.5,
            weights: [0.0; 4],
        };
        let report = score(&features, &params);
        assert!((report.anomaly_score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_flags_raised_above_point_seven() {
        let features = FeatureVector::from_scores(0.8, 0.1, 0.75, 0.1);
        let report = score(&features, &ScoringParameters::heuristic());
        assert_eq!(report.flags, vec![WarningFlag::Texture, WarningFlag::Color]);
    }

    #[test]
    fn test_flags_never_affect_verdict() {
        // Single hot signal raises a flag but the weighted score stays low
        let features = FeatureVector::from_scores(0.9, 0.0, 0.0, 0.0);
        let report = score(&features, &ScoringParameters::heuristic());
        assert_eq!(report.flags, vec![WarningFlag::Texture]);
        assert!(!report.is_suspicious);
    }

    #[test]
    fn test_neutral_report() {
        let report = ScoreReport::neutral("unreadable image");
        assert_eq!(report.anomaly_score, 0.0);
        assert!(!report.is_suspicious);
        assert!(report.status.is_failed());
    }
}
