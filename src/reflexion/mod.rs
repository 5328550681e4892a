//! Reflexion - bounded self-critique over stored judgments
//!
//! A strictly sequential four-stage cycle: Judged -> SelfEvaluated ->
//! ImprovementPlanned -> Revised, then a promotion decision. A failure at
//! any stage substitutes a documented default payload and the cycle runs to
//! completion; it never aborts.

pub mod engine;
pub mod evaluate;
pub mod plan;
pub mod types;

pub use engine::{performance_metrics, ReflexionEngine};
pub use types::{
    ConfidenceAssessment, ImprovementPlan, InitialJudgment, ReflexionMetrics, ReflexionRecord,
    RevisedJudgment, SelfEvaluation,
};
