//! Cycle driver and promotion decision
//!
//! Runs the four stages in order, caps revised confidence at 0.95, and only
//! writes the revision back into the analysis when it strictly improves on
//! the stored confidence. The verdict is never changed by a cycle.

use chrono::Utc;
use uuid::Uuid;

use crate::analysis::AnalysisRecord;
use super::evaluate::self_evaluate;
use super::plan::plan_improvements;
use super::types::{
    InitialJudgment, ReflexionMetrics, ReflexionRecord, RevisedJudgment,
};

const CONFIDENCE_CAP: f32 = 0.95;

pub struct ReflexionEngine {
    model_version: String,
    history: Vec<ReflexionRecord>,
}

impl Default for ReflexionEngine {
    fn default() -> Self {
        Self::new("reflexion-v1")
    }
}

impl ReflexionEngine {
    pub fn new(model_version: impl Into<String>) -> Self {
        Self {
            model_version: model_version.into(),
            history: Vec::new(),
        }
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// The most recent cycle records, oldest first
    pub fn learning_history(&self, limit: usize) -> &[ReflexionRecord] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }

    /// Run one full cycle against a stored analysis. Always returns a record;
    /// `promoted` says whether the analysis was actually updated.
    pub fn run_cycle(&mut self, analysis: &mut AnalysisRecord, iteration: u32) -> ReflexionRecord {
        let initial = InitialJudgment {
            verdict: analysis.verdict,
            confidence: analysis.confidence,
            reasoning: analysis.reasoning.clone(),
        };

        let evaluation = self_evaluate(analysis, &initial);
        let plan = plan_improvements(&evaluation);
        let revised = revise(&initial, &plan.actions, plan.expected_improvement);

        let confidence_delta = revised.confidence - initial.confidence;
        let accuracy_delta = 0.5 * confidence_delta;

        let promoted = revised.confidence > analysis.confidence;
        if promoted {
            analysis.apply_revision(&revised);
            log::info!(
                "reflexion promoted analysis {} at iteration {}: confidence {:.3} -> {:.3}",
                analysis.id,
                iteration,
                initial.confidence,
                revised.confidence
            );
        } else {
            log::debug!(
                "reflexion kept analysis {} unchanged at iteration {}",
                analysis.id,
                iteration
            );
        }

        let record = ReflexionRecord {
            id: Uuid::new_v4().to_string(),
            analysis_id: analysis.id.clone(),
            iteration,
            initial,
            evaluation,
            plan,
            revised,
            accuracy_delta,
            confidence_delta,
            promoted,
            created_at: Utc::now(),
        };
        self.history.push(record.clone());
        record
    }
}

/// Stage 4: fold the plan into a revised judgment. Confidence moves by the
/// plan's expected improvement, capped; the verdict is carried unchanged.
fn revise(initial: &InitialJudgment, actions: &[String], expected_improvement: f32) -> RevisedJudgment {
    let confidence = (initial.confidence + expected_improvement).min(CONFIDENCE_CAP);

    let mut reasoning = initial.reasoning.clone();
    if !actions.is_empty() {
        reasoning.push_str("\n\nrefined after self-review:");
        for action in actions {
            reasoning.push_str("\n- ");
            reasoning.push_str(action);
        }
    }

    RevisedJudgment {
        verdict: initial.verdict,
        confidence,
        reasoning,
        applied_actions: actions.to_vec(),
    }
}

pub fn performance_metrics(records: &[ReflexionRecord]) -> ReflexionMetrics {
    if records.is_empty() {
        return ReflexionMetrics {
            total_cycles: 0,
            avg_accuracy_delta: 0.0,
            avg_confidence_delta: 0.0,
            improved_cycles: 0,
        };
    }

    let n = records.len() as f32;
    ReflexionMetrics {
        total_cycles: records.len(),
        avg_accuracy_delta: records.iter().map(|r| r.accuracy_delta).sum::<f32>() / n,
        avg_confidence_delta: records.iter().map(|r| r.confidence_delta).sum::<f32>() / n,
        improved_cycles: records.iter().filter(|r| r.confidence_delta > 0.0).count(),
    }
}
