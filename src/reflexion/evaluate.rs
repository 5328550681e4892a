//! Stage 2: heuristic self-evaluation
//!
//! Critiques the initial judgment against its corroborating signals. The
//! anomaly score acts as the independent cross-check: a decisive reading in
//! either direction is a strength, a middling one flags a verification gap.

use crate::analysis::AnalysisRecord;
use super::types::{ConfidenceAssessment, InitialJudgment, SelfEvaluation};

const HIGH_CONFIDENCE: f32 = 0.8;
const LOW_CONFIDENCE: f32 = 0.6;
const DECISIVE_HIGH_ANOMALY: f32 = 0.7;
const DECISIVE_LOW_ANOMALY: f32 = 0.3;
const OVERESTIMATE_BAR: f32 = 0.9;
const UNDERESTIMATE_BAR: f32 = 0.5;

/// Minimum populated fields before a detail section counts as substantive
const MIN_DETAIL_FIELDS: usize = 2;

pub fn self_evaluate(analysis: &AnalysisRecord, initial: &InitialJudgment) -> SelfEvaluation {
    if !initial.confidence.is_finite() {
        log::warn!(
            "self-evaluation degraded for analysis {}: non-finite confidence",
            analysis.id
        );
        return default_evaluation();
    }

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut missing_analysis = Vec::new();

    let confidence = initial.confidence;
    if confidence > HIGH_CONFIDENCE {
        strengths.push("clear judgment backed by high confidence".to_string());
    } else if confidence < LOW_CONFIDENCE {
        weaknesses.push("low confidence leaves the judgment uncertain".to_string());
    }

    if let Some(anomaly_score) = analysis.anomaly_score {
        if anomaly_score > DECISIVE_HIGH_ANOMALY {
            strengths.push("anomaly signals strongly corroborate suspicion".to_string());
        } else if anomaly_score < DECISIVE_LOW_ANOMALY {
            strengths.push("anomaly signals confirm a natural pattern".to_string());
        } else {
            missing_analysis
                .push("cross-check needed between anomaly score and visual judgment".to_string());
        }
    }

    if analysis.style_analysis.len() < MIN_DETAIL_FIELDS {
        weaknesses.push("style analysis lacks detail".to_string());
        missing_analysis.push("deeper style analysis needed".to_string());
    }
    if analysis.technique_analysis.len() < MIN_DETAIL_FIELDS {
        weaknesses.push("technique analysis lacks detail".to_string());
        missing_analysis.push("further analysis of materials and technique needed".to_string());
    }

    let confidence_assessment = if confidence > OVERESTIMATE_BAR && !weaknesses.is_empty() {
        ConfidenceAssessment::Overestimated
    } else if confidence < UNDERESTIMATE_BAR && strengths.len() > weaknesses.len() {
        ConfidenceAssessment::Underestimated
    } else {
        ConfidenceAssessment::Appropriate
    };

    let reasoning = format!(
        "{} strengths, {} weaknesses identified",
        strengths.len(),
        weaknesses.len()
    );

    if strengths.is_empty() {
        strengths.push("baseline analysis completed".to_string());
    }
    if weaknesses.is_empty() {
        weaknesses.push("no clear weaknesses identified".to_string());
    }

    SelfEvaluation {
        strengths,
        weaknesses,
        missing_analysis,
        confidence_assessment,
        reasoning,
    }
}

/// Minimal payload substituted when evaluation itself fails
pub fn default_evaluation() -> SelfEvaluation {
    SelfEvaluation {
        strengths: vec!["analysis completed".to_string()],
        weaknesses: vec!["evaluation unavailable".to_string()],
        missing_analysis: Vec::new(),
        confidence_assessment: ConfidenceAssessment::Appropriate,
        reasoning: "default evaluation".to_string(),
    }
}
