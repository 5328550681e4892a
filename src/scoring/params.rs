//! Scoring Parameters - immutable (threshold, weight-vector) snapshots
//!
//! A snapshot is derived fresh per analysis from either the calibrator or the
//! parameter optimizer and never mutated in place. Weights are renormalized
//! to sum to 1 before use; an all-zero weight vector falls back to the
//! uniform default instead of dividing by zero.

use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;

/// Action vector length: [threshold, w_texture, w_edge, w_color, w_noise]
pub const ACTION_DIM: usize = FEATURE_COUNT + 1;

/// Fixed heuristic action, also the optimizer's silent fallback
pub const HEURISTIC_ACTION: [f32; ACTION_DIM] = [0.7, 0.25, 0.25, 0.25, 0.25];

/// Uniform weight vector, the degenerate-weights fallback
pub const UNIFORM_WEIGHTS: [f32; FEATURE_COUNT] = [0.25; FEATURE_COUNT];

const WEIGHT_SUM_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringParameters {
    /// Decision threshold in [0, 1]
    pub threshold: f32,
    /// Raw weight vector; normalized on use
    pub weights: [f32; FEATURE_COUNT],
}

impl ScoringParameters {
    /// The fixed heuristic parameters
    pub fn heuristic() -> Self {
        Self {
            threshold: HEURISTIC_ACTION[0],
            weights: UNIFORM_WEIGHTS,
        }
    }

    /// Calibrated threshold with uniform weights
    pub fn calibrated(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            weights: UNIFORM_WEIGHTS,
        }
    }

    /// Parse an optimizer action. Every component is clamped to [0, 1].
    pub fn from_action(action: &[f32; ACTION_DIM]) -> Self {
        let mut weights = [0.0f32; FEATURE_COUNT];
        for (i, w) in weights.iter_mut().enumerate() {
            let raw = action[i + 1];
            *w = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
        }
        let threshold = if action[0].is_finite() { action[0].clamp(0.0, 1.0) } else { 0.0 };
        Self { threshold, weights }
    }

    /// Weights renormalized to sum to 1, uniform fallback on a zero sum
    pub fn normalized_weights(&self) -> [f32; FEATURE_COUNT] {
        let sum: f32 = self.weights.iter().sum();
        if sum <= WEIGHT_SUM_EPSILON {
            return UNIFORM_WEIGHTS;
        }
        let mut out = self.weights;
        for w in out.iter_mut() {
            *w /= sum;
        }
        out
    }

    /// Encode back to the optimizer's action layout
    pub fn to_action(&self) -> [f32; ACTION_DIM] {
        let w = self.normalized_weights();
        [self.threshold, w[0], w[1], w[2], w[3]]
    }
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self::heuristic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_matches_fixed_action() {
        let p = ScoringParameters::heuristic();
        assert_eq!(p.to_action(), HEURISTIC_ACTION);
    }

    #[test]
    fn test_zero_weights_fall_back_to_uniform() {
        let p = ScoringParameters {
            threshold: 0.5,
            weights: [0.0; FEATURE_COUNT],
        };
        assert_eq!(p.normalized_weights(), UNIFORM_WEIGHTS);
    }

    #[test]
    fn test_normalization_sums_to_one() {
        let p = ScoringParameters {
            threshold: 0.5,
            weights: [0.1, 0.2, 0.3, 0.4],
        };
        let w = p.normalized_weights();
        assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!((w[3] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_from_action_clamps_components() {
        let p = ScoringParameters::from_action(&[1.4, -0.2, 0.5, 0.5, f32::NAN]);
        assert_eq!(p.threshold, 1.0);
        assert_eq!(p.weights[0], 0.0);
        assert_eq!(p.weights[3], 0.0);
        let w = p.normalized_weights();
        assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }
}
