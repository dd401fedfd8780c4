//! Image preprocessing for label photos
//!
//! Crops a label photo down to the bottom band, where the printed tracking
//! number sits next to the barcode, and binarizes that band for OCR. Also
//! provides content hashing so callers can skip duplicate photos.

use image::{DynamicImage, GrayImage};
use imageproc::contrast::{threshold, ThresholdType};
use sha2::{Digest, Sha256};

/// Crop a photo to its bottom band.
///
/// `fraction` is the share of the image height to keep, measured from the
/// bottom edge; the band height is `floor(height * fraction)`, clamped to
/// the image height. A fraction small enough to floor to zero rows yields
/// an empty image, which downstream stages treat as "no text".
pub fn extract_bottom_band(image: &DynamicImage, fraction: f32) -> DynamicImage {
    let height = image.height();
    let band_height = ((f64::from(height) * f64::from(fraction)).floor().max(0.0) as u32).min(height);
    let start_y = height - band_height;
    image.crop_imm(0, start_y, image.width(), band_height)
}

/// Binarize a cropped band with a hard luminance cutoff.
///
/// Pixels brighter than `cutoff` become white background (255), the rest
/// black foreground (0). Dimensions are preserved.
pub fn binarize(region: &DynamicImage, cutoff: u8) -> GrayImage {
    let gray = region.to_luma8();
    threshold(&gray, cutoff, ThresholdType::Binary)
}

/// SHA-256 content hash of an encoded photo, as lowercase hex.
///
/// Byte-identical uploads hash identically, so batch callers can skip
/// photos they have already processed.
pub fn compute_image_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
