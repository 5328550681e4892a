//! Adaptive Threshold Calibrator
//!
//! Recomputes the decision threshold from labeled feedback history. This is
//! a pure function of an explicit feedback snapshot - a full recomputation
//! per call, not an incremental update. Callers should cache per request,
//! not per process, since the feedback store can change between calls.

use crate::feedback::{ground_truth, FeedbackRecord};

/// Fallback threshold when feedback history is too sparse
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// Minimum combined labeled records before calibration kicks in
pub const MIN_CALIBRATION_RECORDS: usize = 10;

/// Operating band for the calibrated threshold
pub const THRESHOLD_FLOOR: f32 = 0.3;
pub const THRESHOLD_CEIL: f32 = 0.9;

/// Derive a threshold from feedback history.
///
/// Partitions ground-truth-bearing records by class and returns the midpoint
/// of the two class score means, clamped to [0.3, 0.9]. Records with an
/// `uncertain` label never contribute.
pub fn calibrate(history: &[FeedbackRecord]) -> f32 {
    let mut authentic_scores = Vec::new();
    let mut fake_scores = Vec::new();

    for record in history {
        match ground_truth(record) {
            Some(true) => authentic_scores.push(record.anomaly_score),
            Some(false) => fake_scores.push(record.anomaly_score),
            None => continue,
        }
    }

    let combined = authentic_scores.len() + fake_scores.len();
    if combined < MIN_CALIBRATION_RECORDS
        || authentic_scores.is_empty()
        || fake_scores.is_empty()
    {
        return DEFAULT_THRESHOLD;
    }

    let optimal = (mean(&authentic_scores) + mean(&fake_scores)) / 2.0;
    let threshold = optimal.clamp(THRESHOLD_FLOOR, THRESHOLD_CEIL);

    log::info!(
        "calibrated threshold {:.2} (authentic mean {:.2}, fake mean {:.2}, {} records)",
        threshold,
        mean(&authentic_scores),
        mean(&fake_scores),
        combined
    );

    threshold
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FeedbackLabel, FeedbackRecord, Verdict};

    fn record(verdict: Verdict, label: FeedbackLabel, anomaly_score: f32) -> FeedbackRecord {
        FeedbackRecord::new(verdict, 0.8, anomaly_score, Some(label))
    }

    #[test]
    fn test_sparse_history_returns_default() {
        let history: Vec<FeedbackRecord> = (0..5)
            .map(|_| record(Verdict::Authentic, FeedbackLabel::Correct, 0.2))
            .collect();
        assert_eq!(calibrate(&history), DEFAULT_THRESHOLD);
        assert_eq!(calibrate(&[]), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_midpoint_of_class_means() {
        let mut history = Vec::new();
        for _ in 0..6 {
            history.push(record(Verdict::Authentic, FeedbackLabel::Correct, 0.2));
        }
        for _ in 0..6 {
            history.push(record(Verdict::Fake, FeedbackLabel::Correct, 0.8));
        }
        assert!((calibrate(&history) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_uncertain_labels_excluded() {
        let mut history = Vec::new();
        for _ in 0..6 {
            history.push(record(Verdict::Authentic, FeedbackLabel::Correct, 0.2));
        }
        for _ in 0..6 {
            history.push(record(Verdict::Fake, FeedbackLabel::Correct, 0.8));
        }
        // A pile of uncertain records must not move the result
        for _ in 0..20 {
            history.push(record(Verdict::Fake, FeedbackLabel::Uncertain, 0.99));
        }
        assert!((calibrate(&history) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_incorrect_label_negates_verdict() {
        // "Fake, incorrect" means ground truth authentic
        let mut history = Vec::new();
        for _ in 0..6 {
            history.push(record(Verdict::Fake, FeedbackLabel::Incorrect, 0.2));
        }
        for _ in 0..6 {
            history.push(record(Verdict::Authentic, FeedbackLabel::Incorrect, 0.8));
        }
        assert!((calibrate(&history) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_to_operating_band() {
        let mut history = Vec::new();
        for _ in 0..6 {
            history.push(record(Verdict::Authentic, FeedbackLabel::Correct, 0.05));
        }
        for _ in 0..6 {
            history.push(record(Verdict::Fake, FeedbackLabel::Correct, 0.1));
        }
        assert_eq!(calibrate(&history), THRESHOLD_FLOOR);
    }

    #[test]
    fn test_single_class_returns_default() {
        let history: Vec<FeedbackRecord> = (0..12)
            .map(|_| record(Verdict::Authentic, FeedbackLabel::Correct, 0.2))
            .collect();
        assert_eq!(calibrate(&history), DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_idempotent_on_unchanged_snapshot() {
        let mut history = Vec::new();
        for i in 0..8 {
            history.push(record(Verdict::Authentic, FeedbackLabel::Correct, 0.1 + i as f32 * 0.02));
        }
        for i in 0..8 {
            history.push(record(Verdict::Fake, FeedbackLabel::Correct, 0.7 + i as f32 * 0.02));
        }
        assert_eq!(calibrate(&history), calibrate(&history));
    }
}
