//! Configuration module
//!
//! `EngineConfig` is loaded once from environment variables with per-field
//! defaults. Runtime kill-switches live on atomics so they can be flipped
//! without restarting the process.

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path of the policy + demonstration snapshot
    pub snapshot_path: PathBuf,

    /// Vision judge endpoint (None = judge unconfigured)
    pub judge_base_url: Option<String>,

    /// Vision judge model identifier
    pub judge_model: String,

    /// Vision judge API key
    pub judge_api_key: Option<String>,

    /// Reinforcement-learning hyperparameters
    pub rl: RlConfig,
}

/// Optimizer hyperparameters. Tuning knobs, not behavior contracts.
#[derive(Debug, Clone)]
pub struct RlConfig {
    pub learning_rate: f32,
    pub batch_size: usize,
    pub gamma: f32,
    pub replay_capacity: usize,
    pub hidden_size: usize,
    pub noise_sigma: f32,
    pub pretrain_epochs: usize,
}

impl Default for RlConfig {
    fn default() -> Self {
        Self {
            learning_rate: 3e-4,
            batch_size: 64,
            gamma: 0.99,
            replay_capacity: 100_000,
            hidden_size: 32,
            noise_sigma: 0.1,
            pretrain_epochs: 100,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            judge_base_url: None,
            judge_model: "gpt-4o".to_string(),
            judge_api_key: None,
            rl: RlConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let rl = RlConfig {
            learning_rate: parse_env("ARTAUTH_RL_LEARNING_RATE", 3e-4),
            batch_size: parse_env("ARTAUTH_RL_BATCH_SIZE", 64),
            gamma: parse_env("ARTAUTH_RL_GAMMA", 0.99),
            replay_capacity: parse_env("ARTAUTH_RL_REPLAY_CAPACITY", 100_000),
            hidden_size: parse_env("ARTAUTH_RL_HIDDEN_SIZE", 32),
            noise_sigma: parse_env("ARTAUTH_RL_NOISE_SIGMA", 0.1),
            pretrain_epochs: parse_env("ARTAUTH_RL_PRETRAIN_EPOCHS", 100),
        };

        Self {
            snapshot_path: env::var("ARTAUTH_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_snapshot_path()),
            judge_base_url: env::var("ARTAUTH_JUDGE_URL").ok(),
            judge_model: env::var("ARTAUTH_JUDGE_MODEL")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
            judge_api_key: env::var("ARTAUTH_JUDGE_API_KEY").ok(),
            rl,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Default snapshot location under the local data directory
pub fn default_snapshot_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("artauth")
        .join("policy_snapshot.json")
}

// Kill-switches. Default state: all systems nominal (enabled).
static RL_ENABLED: AtomicBool = AtomicBool::new(true);
static LEARNING_ENABLED: AtomicBool = AtomicBool::new(true);
static JUDGE_ENABLED: AtomicBool = AtomicBool::new(true);

pub struct SafetyConfig;

impl SafetyConfig {
    /// Learned scoring parameters allowed?
    pub fn is_rl_enabled() -> bool {
        RL_ENABLED.load(Ordering::Relaxed)
    }

    /// Offline training job allowed?
    pub fn is_learning_enabled() -> bool {
        LEARNING_ENABLED.load(Ordering::Relaxed)
    }

    /// Outbound vision-judge calls allowed?
    pub fn is_judge_enabled() -> bool {
        JUDGE_ENABLED.load(Ordering::Relaxed)
    }

    pub fn set_rl(val: bool) { RL_ENABLED.store(val, Ordering::Relaxed); }
    pub fn set_learning(val: bool) { LEARNING_ENABLED.store(val, Ordering::Relaxed); }
    pub fn set_judge(val: bool) { JUDGE_ENABLED.store(val, Ordering::Relaxed); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hyperparameters() {
        let config = RlConfig::default();
        assert_eq!(config.batch_size, 64);
        assert!((config.learning_rate - 3e-4).abs() < 1e-9);
        assert_eq!(config.replay_capacity, 100_000);
    }

    #[test]
    fn test_safety_config_defaults() {
        assert!(SafetyConfig::is_rl_enabled());
        assert!(SafetyConfig::is_learning_enabled());
        assert!(SafetyConfig::is_judge_enabled());
    }
}
