//! Core types for the labeltrack pipeline

use serde::{Deserialize, Serialize};

/// Tuning knobs for the label processing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Share of the image height, measured from the bottom edge, expected
    /// to contain the printed tracking number. Must be in (0, 1].
    pub bottom_fraction: f32,
    /// Luminance cutoff for binarization: pixels brighter than this become
    /// white background, everything else black foreground.
    pub binarize_threshold: u8,
    /// Ordered marker words for the proximity fallback search, compared
    /// against the uppercased OCR text. Mixed Polish/English, as printed
    /// on the label stock.
    pub keywords: Vec<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            bottom_fraction: 0.18,
            binarize_threshold: 140,
            keywords: default_keywords(),
        }
    }
}

/// The marker words shipped as the default fallback list.
pub fn default_keywords() -> Vec<String> {
    ["DPD", "NR", "TRACKING", "PRZESYLKA", "NUMER"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// A corrected parcel tracking number.
///
/// The canonical shape is 13 digits followed by a single uppercase service
/// letter. Shorter digit strings that survived extraction but could not be
/// completed are carried as-is and report `is_complete() == false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a full canonical number: 13 digits plus one
    /// trailing uppercase letter.
    pub fn is_complete(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() == 14
            && bytes[..13].iter().all(|b| b.is_ascii_digit())
            && bytes[13].is_ascii_uppercase()
    }
}

impl std::fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = LabelConfig::default();
        assert_eq!(config.bottom_fraction, 0.18);
        assert_eq!(config.binarize_threshold, 140);
        assert_eq!(config.keywords[0], "DPD");
        assert_eq!(config.keywords.len(), 5);
    }

    #[test]
    fn complete_number_shape() {
        assert!(TrackingNumber::new("1055747430248U").is_complete());
        assert!(!TrackingNumber::new("105574743024U").is_complete());
        assert!(!TrackingNumber::new("1055747430248").is_complete());
        assert!(!TrackingNumber::new("9988776655").is_complete());
        assert!(!TrackingNumber::new("").is_complete());
        assert!(!TrackingNumber::new("1055747430248u").is_complete());
    }

    #[test]
    fn tracking_number_serializes_as_plain_string() {
        let number = TrackingNumber::new("1055747430248U");
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"1055747430248U\"");
        let back: TrackingNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, number);
    }
}
