//! Feature Extraction - image-derived anomaly signals
//!
//! Four independent suspicion signals computed from a decoded raster image:
//! texture (Laplacian variance), edge (edge-pixel density), color (channel
//! entropy) and noise (residual after Gaussian blur). Each signal is a pure
//! function of pixel data and lands in [0, 1].

pub mod extract;
pub mod layout;
pub mod vector;

pub use extract::{extract, extract_from_bytes, FeatureReport};
pub use layout::{layout_hash, validate_layout, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::FeatureVector;
