//! Scoring - weighted anomaly verdicts and their parameters
//!
//! - `params` - immutable (threshold, weight-vector) snapshots
//! - `scorer` - deterministic weighted scoring with warning flags
//! - `calibrator` - feedback-driven threshold recomputation
//! - `rl_scorer` - the RL -> heuristic -> neutral fallback pipeline

pub mod calibrator;
pub mod params;
pub mod rl_scorer;
pub mod scorer;

pub use calibrator::{calibrate, DEFAULT_THRESHOLD, MIN_CALIBRATION_RECORDS};
pub use params::{ScoringParameters, ACTION_DIM, HEURISTIC_ACTION};
pub use rl_scorer::{AnalysisOutcome, RlScorer, ScoringMode};
pub use scorer::{score, ScoreReport, WarningFlag};
