//! Vision Judge - the external judgment contract
//!
//! The core treats the judge as an opaque, fallible oracle. Provider
//! selection is a capability-tagged variant resolved once from explicit
//! configuration at this boundary - never by inspecting model-name strings
//! inside the core.

pub mod http;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::feedback::Verdict;

pub use http::HttpVisionJudge;

/// Structured judgment returned by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgment {
    pub verdict: Verdict,
    /// 0.0 to 1.0
    pub confidence: f32,
    pub style_notes: BTreeMap<String, String>,
    pub technique_notes: BTreeMap<String, String>,
    pub reasoning: String,
}

/// Catalog context forwarded to the provider's prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptContext {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("judge is not configured: {0}")]
    Unconfigured(String),
    #[error("invalid API key")]
    InvalidApiKey,
    #[error("rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("provider returned status {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed judgment payload: {0}")]
    Malformed(String),
}

pub trait VisionJudge: Send + Sync {
    fn judge(&self, image: &[u8], ctx: &PromptContext) -> Result<Judgment, JudgeError>;
}

/// Capability-tagged provider selection, resolved once from configuration
#[derive(Debug, Clone)]
pub enum JudgeProvider {
    /// Chat-completions style HTTP endpoint accepting inline images
    OpenAiCompatible {
        base_url: String,
        model: String,
        api_key: String,
    },
    Disabled,
}

impl JudgeProvider {
    pub fn from_config(config: &EngineConfig) -> Self {
        match (&config.judge_base_url, &config.judge_api_key) {
            (Some(url), Some(key)) => JudgeProvider::OpenAiCompatible {
                base_url: url.clone(),
                model: config.judge_model.clone(),
                api_key: key.clone(),
            },
            _ => JudgeProvider::Disabled,
        }
    }

    pub fn resolve(self) -> Result<Box<dyn VisionJudge>, JudgeError> {
        match self {
            JudgeProvider::OpenAiCompatible { base_url, model, api_key } => {
                Ok(Box::new(HttpVisionJudge::new(base_url, model, api_key)))
            }
            JudgeProvider::Disabled => Err(JudgeError::Unconfigured(
                "no judge endpoint or API key configured".to_string(),
            )),
        }
    }
}

/// Fixed-response judge for tests
pub struct ScriptedJudge {
    pub judgment: Judgment,
}

impl VisionJudge for ScriptedJudge {
    fn judge(&self, _image: &[u8], _ctx: &PromptContext) -> Result<Judgment, JudgeError> {
        Ok(self.judgment.clone())
    }
}
