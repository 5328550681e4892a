//! Signal extraction from a decoded raster image
//!
//! Each signal is defensive: an internal failure yields 0.0 for that signal
//! instead of propagating. An image that cannot be decoded at all yields the
//! neutral zero vector with an explicit failed status - never a guess.

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisStatus;
use super::vector::FeatureVector;

/// Laplacian variance at or above this reads as fully natural texture
const TEXTURE_VARIANCE_SCALE: f64 = 1000.0;

/// Natural edge-pixel density band
const EDGE_DENSITY_LOW: f64 = 0.10;
const EDGE_DENSITY_HIGH: f64 = 0.30;

/// Natural per-channel entropy band (bits)
const ENTROPY_LOW: f64 = 4.0;
const ENTROPY_HIGH: f64 = 7.0;

/// Noise (mean + std of blur residual) normalization
const NOISE_SCALE: f64 = 100.0;

/// Canny hysteresis thresholds
const CANNY_LOW: f32 = 100.0;
const CANNY_HIGH: f32 = 200.0;

/// Sigma matching a 5x5 Gaussian kernel
const BLUR_SIGMA: f32 = 1.1;

/// Extraction result: the vector plus an explicit ok/failed status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureReport {
    pub vector: FeatureVector,
    pub status: AnalysisStatus,
}

impl FeatureReport {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            vector: FeatureVector::neutral(),
            status: AnalysisStatus::failed(reason),
        }
    }
}

/// Compute the four anomaly signals from a decoded image
pub fn extract(img: &DynamicImage) -> FeatureReport {
    if img.width() == 0 || img.height() == 0 {
        return FeatureReport::failed("empty image");
    }

    let gray = img.to_luma8();
    let rgb = img.to_rgb8();

    let texture = texture_anomaly(&gray);
    let edge = edge_anomaly(&gray);
    let color = color_anomaly(&rgb);
    let noise = noise_anomaly(&gray);

    FeatureReport {
        vector: FeatureVector::from_scores(texture, edge, color, noise),
        status: AnalysisStatus::Ok,
    }
}

/// Decode raw bytes, then extract
pub fn extract_from_bytes(bytes: &[u8]) -> FeatureReport {
    match image::load_from_memory(bytes) {
        Ok(img) => extract(&img),
        Err(e) => {
            log::warn!("image decode failed: {}", e);
            FeatureReport::failed(format!("image decode failed: {}", e))
        }
    }
}

/// Texture anomaly: low Laplacian variance (over-smooth image) is suspicious
fn texture_anomaly(gray: &GrayImage) -> f32 {
    let laplacian = imageproc::filter::laplacian_filter(gray);
    let n = laplacian.pixels().len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let mean: f64 = laplacian.pixels().map(|p| p.0[0] as f64).sum::<f64>() / n;
    let variance: f64 = laplacian
        .pixels()
        .map(|p| {
            let d = p.0[0] as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    (1.0 - (variance / TEXTURE_VARIANCE_SCALE).min(1.0)) as f32
}

/// Edge anomaly: edge-pixel density outside the natural [0.10, 0.30] band
fn edge_anomaly(gray: &GrayImage) -> f32 {
    let edges = imageproc::edges::canny(gray, CANNY_LOW, CANNY_HIGH);
    let total = edges.pixels().len() as f64;
    if total == 0.0 {
        return 0.0;
    }

    let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count() as f64;
    let density = edge_pixels / total;

    let score = if (EDGE_DENSITY_LOW..=EDGE_DENSITY_HIGH).contains(&density) {
        0.0
    } else if density < EDGE_DENSITY_LOW {
        (EDGE_DENSITY_LOW - density) / EDGE_DENSITY_LOW
    } else {
        (density - EDGE_DENSITY_HIGH) / (1.0 - EDGE_DENSITY_HIGH)
    };

    score as f32
}

/// Color anomaly: mean base-2 entropy of the channel histograms outside [4, 7]
fn color_anomaly(rgb: &RgbImage) -> f32 {
    let total = rgb.pixels().len() as f64;
    if total == 0.0 {
        return 0.0;
    }

    let mut hists = [[0u32; 256]; 3];
    for p in rgb.pixels() {
        for c in 0..3 {
            hists[c][p.0[c] as usize] += 1;
        }
    }

    let avg_entropy: f64 = hists.iter().map(|h| channel_entropy(h, total)).sum::<f64>() / 3.0;

    let score = if (ENTROPY_LOW..=ENTROPY_HIGH).contains(&avg_entropy) {
        0.0
    } else if avg_entropy < ENTROPY_LOW {
        (ENTROPY_LOW - avg_entropy) / ENTROPY_LOW
    } else {
        (avg_entropy - ENTROPY_HIGH) / 8.0
    };

    score as f32
}

/// Shannon entropy (base 2) of one channel histogram, zero bins excluded
fn channel_entropy(hist: &[u32; 256], total: f64) -> f64 {
    hist.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Noise anomaly: statistics of the residual after Gaussian blur
fn noise_anomaly(gray: &GrayImage) -> f32 {
    let blurred = imageproc::filter::gaussian_blur_f32(gray, BLUR_SIGMA);
    let n = gray.pixels().len() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let residuals: Vec<f64> = gray
        .pixels()
        .zip(blurred.pixels())
        .map(|(a, b)| (a.0[0] as f64 - b.0[0] as f64).abs())
        .collect();

    let mean = residuals.iter().sum::<f64>() / n;
    let variance = residuals.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / n;
    let std = variance.sqrt();

    (((mean + std) / NOISE_SCALE).min(1.0)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    fn solid_image(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            width,
            height,
            Rgb([value, value, value]),
        ))
    }

    #[test]
    fn test_all_black_image_is_over_smooth() {
        let report = extract(&solid_image(64, 64, 0));
        assert!(report.status.is_ok());
        // No high-frequency content: texture anomaly saturates near 1.0
        assert!(report.vector.texture() > 0.95);
        // Single-bin histogram: entropy 0 => maximal color anomaly
        assert!(report.vector.color() > 0.95);
        // No edges at all is below the natural density band
        assert!(report.vector.edge() > 0.95);
        // Blur residual of a flat image is zero
        assert!(report.vector.noise() < 0.05);
    }

    #[test]
    fn test_all_scores_clamped() {
        // Checkerboard maximizes Laplacian variance and edge density
        let img = DynamicImage::ImageLuma8(ImageBuffer::from_fn(64, 64, |x, y| {
            Luma([if (x + y) % 2 == 0 { 0 } else { 255 }])
        }));
        let report = extract(&img);
        for &v in report.vector.as_slice() {
            assert!((0.0..=1.0).contains(&v), "score out of range: {}", v);
        }
    }

    #[test]
    fn test_unreadable_bytes_yield_neutral_failure() {
        let report = extract_from_bytes(b"not an image at all");
        assert!(report.status.is_failed());
        assert_eq!(report.vector, FeatureVector::neutral());
    }

    #[test]
    fn test_deterministic() {
        let img = solid_image(32, 32, 128);
        let a = extract(&img);
        let b = extract(&img);
        assert_eq!(a.vector, b.vector);
    }
}
