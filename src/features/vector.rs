//! Feature Vector - versioned 4-signal anomaly reading
//!
//! Values are clamped to [0, 1] on construction. The vector is recomputed on
//! every analysis and only persisted embedded in the scorer's detail payload.

use serde::{Deserialize, Serialize};

use super::layout::{
    feature_index, layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT,
    FEATURE_LAYOUT, FEATURE_VERSION,
};

/// Versioned feature vector with layout metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Signal values in the order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Neutral all-zero vector (the "analysis failed" substitute)
    pub fn neutral() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: [0.0; FEATURE_COUNT],
        }
    }

    /// Build from the four signal scores, clamping each to [0, 1]
    pub fn from_scores(texture: f32, edge: f32, color: f32, noise: f32) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: [clamp(texture), clamp(edge), clamp(color), clamp(noise)],
        }
    }

    pub fn texture(&self) -> f32 { self.values[0] }
    pub fn edge(&self) -> f32 { self.values[1] }
    pub fn color(&self) -> f32 { self.values[2] }
    pub fn noise(&self) -> f32 { self.values[3] }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Mean of the four signals (the exploration-reward input)
    pub fn mean(&self) -> f32 {
        self.values.iter().sum::<f32>() / FEATURE_COUNT as f32
    }

    /// Get a signal by layout name
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        feature_index(name).map(|i| self.values[i])
    }

    /// Validate against the current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// Named values for the persisted detail payload
    pub fn to_detail(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "texture_anomaly": self.texture(),
            "edge_anomaly": self.edge(),
            "color_anomaly": self.color(),
            "noise_anomaly": self.noise(),
        })
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_vector() {
        let v = FeatureVector::neutral();
        assert_eq!(v.values, [0.0; FEATURE_COUNT]);
        assert!(v.validate().is_ok());
    }

    #[test]
    fn test_from_scores_clamps() {
        let v = FeatureVector::from_scores(-0.5, 1.7, 0.4, f32::NAN);
        assert_eq!(v.texture(), 0.0);
        assert_eq!(v.edge(), 1.0);
        assert_eq!(v.color(), 0.4);
        assert_eq!(v.noise(), 0.0);
    }

    #[test]
    fn test_mean_and_names() {
        let v = FeatureVector::from_scores(0.2, 0.4, 0.6, 0.8);
        assert!((v.mean() - 0.5).abs() < 1e-6);
        assert_eq!(v.get_by_name("edge_anomaly"), Some(0.4));
        assert_eq!(v.get_by_name("unknown"), None);
    }

    #[test]
    fn test_detail_payload() {
        let v = FeatureVector::from_scores(0.1, 0.2, 0.3, 0.4);
        let detail = v.to_detail();
        assert_eq!(detail["feature_version"], FEATURE_VERSION);
        assert!((detail["color_anomaly"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }
}
