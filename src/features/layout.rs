//! Feature Layout - single source of truth for signal ordering
//!
//! Persisted records carry the layout version and a CRC32 hash of the layout
//! so that a reordered or renamed signal is detected instead of silently
//! misread.

use thiserror::Error;

/// Number of anomaly signals
pub const FEATURE_COUNT: usize = 4;

/// Feature layout version
pub const FEATURE_VERSION: u8 = 1;

/// Signal names in canonical order
pub const FEATURE_LAYOUT: &[&str; FEATURE_COUNT] = &[
    "texture_anomaly",
    "edge_anomaly",
    "color_anomaly",
    "noise_anomaly",
];

/// CRC32 hash of the layout (names in order)
pub fn layout_hash() -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(b"|");
    }
    hasher.finalize()
}

/// Index of a signal by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|n| *n == name)
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutMismatchError {
    #[error("feature version mismatch: record has v{found}, layout is v{expected}")]
    Version { found: u8, expected: u8 },
    #[error("feature layout hash mismatch: record has {found:#010x}, layout is {expected:#010x}")]
    Hash { found: u32, expected: u32 },
}

/// Validate a persisted (version, hash) pair against the current layout
pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    if version != FEATURE_VERSION {
        return Err(LayoutMismatchError::Version { found: version, expected: FEATURE_VERSION });
    }
    let expected = layout_hash();
    if hash != expected {
        return Err(LayoutMismatchError::Hash { found: hash, expected });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_hash_stable() {
        assert_eq!(layout_hash(), layout_hash());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("texture_anomaly"), Some(0));
        assert_eq!(feature_index("noise_anomaly"), Some(3));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(matches!(
            validate_layout(FEATURE_VERSION + 1, layout_hash()),
            Err(LayoutMismatchError::Version { .. })
        ));
        assert!(matches!(
            validate_layout(FEATURE_VERSION, layout_hash() ^ 1),
            Err(LayoutMismatchError::Hash { .. })
        ));
    }
}
