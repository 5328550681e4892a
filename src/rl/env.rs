//! Training environments
//!
//! One analysis is one episode. The action is a complete parameter snapshot,
//! so there is nothing to carry between steps; the episode terminates
//! immediately and the reward is fully determined by the single decision.

use image::DynamicImage;

use crate::features::{extract, FeatureVector, FEATURE_COUNT};
use crate::scoring::{score, ScoringParameters, ACTION_DIM};

/// Reward for a decision without ground truth whose signals sit in the
/// ambiguous middle band
const EXPLORATION_REWARD: f32 = 0.1;
const EXPLORATION_BAND_LOW: f32 = 0.3;
const EXPLORATION_BAND_HIGH: f32 = 0.7;

/// Reward for one scoring decision.
///
/// Labeled episodes pay +1/-1 on agreement with ground truth. Unlabeled
/// episodes pay a small bonus only when the mean signal is genuinely
/// ambiguous, where threshold placement actually matters.
pub fn compute_reward(ground_truth: Option<bool>, predicted_authentic: bool, feature_mean: f32) -> f32 {
    match ground_truth {
        Some(actual) => {
            if predicted_authentic == actual {
                1.0
            } else {
                -1.0
            }
        }
        None => {
            if (EXPLORATION_BAND_LOW..=EXPLORATION_BAND_HIGH).contains(&feature_mean) {
                EXPLORATION_REWARD
            } else {
                0.0
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: Vec<f32>,
    pub reward: f32,
    pub terminated: bool,
    pub info: StepInfo,
}

/// Diagnostics carried alongside the reward
#[derive(Debug, Clone)]
pub struct StepInfo {
    pub anomaly_score: f32,
    pub is_suspicious: bool,
    pub threshold: f32,
}

pub trait Environment {
    fn state_dim(&self) -> usize;
    fn reset(&mut self) -> Vec<f32>;
    fn step(&mut self, action: &[f32; ACTION_DIM]) -> StepOutcome;
}

/// One artwork with an optional ground-truth authenticity label
#[derive(Debug, Clone)]
pub struct ArtworkSample {
    pub features: FeatureVector,
    pub ground_truth: Option<bool>,
}

impl ArtworkSample {
    pub fn new(features: FeatureVector, ground_truth: Option<bool>) -> Self {
        Self { features, ground_truth }
    }
}

fn decide(features: &FeatureVector, ground_truth: Option<bool>, action: &[f32; ACTION_DIM]) -> (f32, StepInfo) {
    let params = ScoringParameters::from_action(action);
    let report = score(features, &params);
    let predicted_authentic = !report.is_suspicious;
    let reward = compute_reward(ground_truth, predicted_authentic, features.mean());
    let info = StepInfo {
        anomaly_score: report.anomaly_score,
        is_suspicious: report.is_suspicious,
        threshold: report.threshold,
    };
    (reward, info)
}

/// Single-artwork environment: every episode is one step
pub struct ArtworkAuthEnv {
    features: FeatureVector,
    ground_truth: Option<bool>,
}

impl ArtworkAuthEnv {
    pub fn from_features(features: FeatureVector, ground_truth: Option<bool>) -> Self {
        Self { features, ground_truth }
    }

    /// Extraction failures leave a neutral vector; the episode still runs,
    /// it just carries no signal.
    pub fn from_image(image: &DynamicImage, ground_truth: Option<bool>) -> Self {
        let report = extract(image);
        Self::from_features(report.vector, ground_truth)
    }
}

impl Environment for ArtworkAuthEnv {
    fn state_dim(&self) -> usize {
        FEATURE_COUNT
    }

    fn reset(&mut self) -> Vec<f32> {
        self.features.as_slice().to_vec()
    }

    fn step(&mut self, action: &[f32; ACTION_DIM]) -> StepOutcome {
        let (reward, info) = decide(&self.features, self.ground_truth, action);
        StepOutcome {
            state: self.features.as_slice().to_vec(),
            reward,
            terminated: true,
            info,
        }
    }
}

/// Multi-artwork environment for offline training runs. The state appends a
/// progress scalar so the policy can tell where in the batch it is; the
/// episode terminates after the last sample.
pub struct BatchAuthEnv {
    samples: Vec<ArtworkSample>,
    cursor: usize,
}

impl BatchAuthEnv {
    pub fn new(samples: Vec<ArtworkSample>) -> Self {
        Self { samples, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn state_at(&self, cursor: usize) -> Vec<f32> {
        let progress = if self.samples.is_empty() {
            1.0
        } else {
            cursor as f32 / self.samples.len() as f32
        };
        let mut state = match self.samples.get(cursor) {
            Some(sample) => sample.features.as_slice().to_vec(),
            None => vec![0.0; FEATURE_COUNT],
        };
        state.push(progress);
        state
    }
}

impl Environment for BatchAuthEnv {
    fn state_dim(&self) -> usize {
        FEATURE_COUNT + 1
    }

    fn reset(&mut self) -> Vec<f32> {
        self.cursor = 0;
        self.state_at(0)
    }

    fn step(&mut self, action: &[f32; ACTION_DIM]) -> StepOutcome {
        let Some(sample) = self.samples.get(self.cursor) else {
            return StepOutcome {
                state: self.state_at(self.cursor),
                reward: 0.0,
                terminated: true,
                info: StepInfo { anomaly_score: 0.0, is_suspicious: false, threshold: 0.0 },
            };
        };

        let (reward, info) = decide(&sample.features, sample.ground_truth, action);
        self.cursor += 1;
        let terminated = self.cursor >= self.samples.len();
        StepOutcome {
            state: self.state_at(self.cursor),
            reward,
            terminated,
            info,
        }
    }
}
