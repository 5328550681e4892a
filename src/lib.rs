//! Artwork Authentication - Adaptive Scoring Core
//!
//! Combines an external vision-language judgment with a locally computed
//! anomaly score, then improves itself from user feedback:
//!
//! - `features/` - image-derived anomaly signals (texture, edge, color, noise)
//! - `scoring/` - weighted anomaly scorer, adaptive threshold calibration,
//!   RL-backed parameter selection with heuristic fallback
//! - `reflexion/` - four-stage self-critique cycle over stored judgments
//! - `rl/` - demonstration-seeded parameter optimizer (one-step environment,
//!   actor-critic agent, versioned policy snapshots)
//! - `feedback/` - the feedback store contract and implementations
//! - `judge/` - the vision judge contract

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod feedback;
pub mod judge;
pub mod reflexion;
pub mod rl;
pub mod scoring;

pub use analysis::AnalysisRecord;
pub use error::AnalysisStatus;
pub use features::{FeatureReport, FeatureVector};
pub use feedback::{FeedbackLabel, FeedbackRecord, FeedbackStore, Verdict};
pub use scoring::{RlScorer, ScoreReport, ScoringParameters};
