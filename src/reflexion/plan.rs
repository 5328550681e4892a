//! Stage 3: improvement planning
//!
//! Maps weakness keywords to concrete follow-up actions, adds one action per
//! missing-analysis item, and bounds the expected improvement at 0.2.

use once_cell::sync::Lazy;

use super::types::{ImprovementPlan, SelfEvaluation};

const IMPROVEMENT_PER_ACTION: f32 = 0.05;
const MAX_EXPECTED_IMPROVEMENT: f32 = 0.2;

/// (trigger keywords, priority area, action)
static KEYWORD_ACTIONS: Lazy<Vec<(&[&str], &str, &str)>> = Lazy::new(|| {
    vec![
        (
            &["confidence", "uncertain"][..],
            "confidence improvement",
            "apply multi-layer verification",
        ),
        (
            &["style"][..],
            "style analysis",
            "deepen brushwork/color/composition analysis",
        ),
        (
            &["technique", "material"][..],
            "technical analysis",
            "verify materials, aging and period technique",
        ),
    ]
});

pub fn plan_improvements(evaluation: &SelfEvaluation) -> ImprovementPlan {
    let mut priority_areas = Vec::new();
    let mut actions = Vec::new();

    for weakness in &evaluation.weaknesses {
        for (keywords, area, action) in KEYWORD_ACTIONS.iter() {
            if keywords.iter().any(|k| weakness.contains(k)) {
                priority_areas.push(area.to_string());
                actions.push(action.to_string());
            }
        }
    }

    for missing in &evaluation.missing_analysis {
        actions.push(format!("additional analysis: {}", missing));
    }

    let expected_improvement =
        (IMPROVEMENT_PER_ACTION * actions.len() as f32).min(MAX_EXPECTED_IMPROVEMENT);

    ImprovementPlan {
        priority_areas,
        actions,
        expected_improvement,
    }
}

/// Empty plan substituted when planning fails: no actions, no optimism
pub fn default_plan() -> ImprovementPlan {
    ImprovementPlan {
        priority_areas: Vec::new(),
        actions: Vec::new(),
        expected_improvement: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::types::ConfidenceAssessment;

    fn evaluation(weaknesses: Vec<&str>, missing: Vec<&str>) -> SelfEvaluation {
        SelfEvaluation {
            strengths: vec![],
            weaknesses: weaknesses.into_iter().map(String::from).collect(),
            missing_analysis: missing.into_iter().map(String::from).collect(),
            confidence_assessment: ConfidenceAssessment::Appropriate,
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_keyword_mapping() {
        let eval = evaluation(
            vec![
                "low confidence leaves the judgment uncertain",
                "style analysis lacks detail",
                "technique analysis lacks detail",
            ],
            vec![],
        );
        let plan = plan_improvements(&eval);
        assert!(plan.actions.contains(&"apply multi-layer verification".to_string()));
        assert!(plan
            .actions
            .contains(&"deepen brushwork/color/composition analysis".to_string()));
        assert!(plan
            .actions
            .contains(&"verify materials, aging and period technique".to_string()));
        assert_eq!(plan.priority_areas.len(), 3);
    }

    #[test]
    fn test_one_action_per_missing_item() {
        let eval = evaluation(vec![], vec!["deeper style analysis needed", "pigment dating"]);
        let plan = plan_improvements(&eval);
        assert_eq!(plan.actions.len(), 2);
        assert!(plan.actions[0].starts_with("additional analysis:"));
    }

    #[test]
    fn test_expected_improvement_linear_then_capped() {
        let eval = evaluation(vec![], vec!["a", "b"]);
        let plan = plan_improvements(&eval);
        assert!((plan.expected_improvement - 0.1).abs() < 1e-6);

        let eval = evaluation(vec![], vec!["a", "b", "c", "d", "e", "f"]);
        let plan = plan_improvements(&eval);
        assert!((plan.expected_improvement - MAX_EXPECTED_IMPROVEMENT).abs() < 1e-6);
    }

    #[test]
    fn test_no_matching_keywords_yields_no_actions() {
        let eval = evaluation(vec!["no clear weaknesses identified"], vec![]);
        let plan = plan_improvements(&eval);
        assert!(plan.actions.is_empty());
        assert_eq!(plan.expected_improvement, 0.0);
    }
}
