//! Reflexion cycle data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feedback::Verdict;

/// Stage 1: the judgment snapshot extracted from the stored analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialJudgment {
    pub verdict: Verdict,
    pub confidence: f32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceAssessment {
    Appropriate,
    Overestimated,
    Underestimated,
}

/// Stage 2: the heuristic self-critique
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfEvaluation {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_analysis: Vec<String>,
    pub confidence_assessment: ConfidenceAssessment,
    pub reasoning: String,
}

/// Stage 3: concrete follow-up actions and a capped optimism bound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementPlan {
    pub priority_areas: Vec<String>,
    pub actions: Vec<String>,
    /// min(0.05 * actions, 0.2) - a bound, not a measurement
    pub expected_improvement: f32,
}

/// Stage 4: the revised judgment. The verdict is carried over unchanged;
/// the cycle refines confidence and narrative only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisedJudgment {
    pub verdict: Verdict,
    pub confidence: f32,
    pub reasoning: String,
    pub applied_actions: Vec<String>,
}

/// One record per cycle iteration, immutable once written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflexionRecord {
    pub id: String,
    pub analysis_id: String,
    /// Numbered from 1; chaining across iterations is the caller's job
    pub iteration: u32,
    pub initial: InitialJudgment,
    pub evaluation: SelfEvaluation,
    pub plan: ImprovementPlan,
    pub revised: RevisedJudgment,
    /// 0.5 * confidence_delta - reporting proxy, no ground truth at cycle time
    pub accuracy_delta: f32,
    pub confidence_delta: f32,
    pub promoted: bool,
    pub created_at: DateTime<Utc>,
}

/// Aggregate over a set of reflexion records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflexionMetrics {
    pub total_cycles: usize,
    pub avg_accuracy_delta: f32,
    pub avg_confidence_delta: f32,
    pub improved_cycles: usize,
}
