//! Pipeline orchestration
//!
//! Composes the processing stages: decode → bottom band → binarize → OCR →
//! candidate search → correction. One invocation owns no shared state, so
//! separate invocations may run in parallel without coordination.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use thiserror::Error;
use tracing::{debug, warn};

use crate::candidate::find_candidate;
use crate::correct::correct;
use crate::ocr::OcrEngine;
use crate::preprocess::{binarize, extract_bottom_band};
use crate::types::{LabelConfig, TrackingNumber};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Everything one pipeline run produces.
///
/// `tracking_number` is `None` both when the label genuinely holds no
/// readable number and when the OCR engine failed; the two cases are told
/// apart in the logs only. The original and binarized images ride along
/// for diagnostic display.
#[derive(Debug)]
pub struct LabelScan {
    /// Corrected number, if any candidate was found.
    pub tracking_number: Option<TrackingNumber>,
    /// Raw candidate as it appeared in the OCR text, before correction.
    pub candidate: Option<String>,
    /// Untouched OCR engine output.
    pub ocr_text: String,
    /// The decoded input photo.
    pub original: DynamicImage,
    /// The cropped, binarized band that was fed to OCR.
    pub binarized: GrayImage,
}

/// Orchestrates: decode → crop → binarize → OCR → find candidate → correct.
pub struct LabelPipeline<R: OcrEngine> {
    engine: R,
    config: LabelConfig,
}

impl<R: OcrEngine> LabelPipeline<R> {
    pub fn new(engine: R, config: LabelConfig) -> Self {
        Self { engine, config }
    }

    /// Process an encoded photo (JPEG / PNG / …).
    pub fn process_bytes(&self, data: &[u8]) -> Result<LabelScan, PipelineError> {
        let original = image::load_from_memory(data)?;

        let band = extract_bottom_band(&original, self.config.bottom_fraction);
        let binarized = binarize(&band, self.config.binarize_threshold);

        // An engine failure is reported like an unreadable label; the
        // distinction stays visible in the logs.
        let ocr_text = match self.engine.recognize(&binarized) {
            Ok(text) => text,
            Err(err) => {
                warn!(%err, "OCR engine failed, treating label as unreadable");
                String::new()
            }
        };
        debug!(text = %ocr_text, "raw OCR output");

        let candidate = find_candidate(&ocr_text, &self.config.keywords);
        let tracking_number = candidate.as_deref().and_then(correct);

        Ok(LabelScan {
            tracking_number,
            candidate,
            ocr_text,
            original,
            binarized,
        })
    }

    /// Process a photo on disk.
    pub fn process_file(&self, path: &Path) -> Result<LabelScan, PipelineError> {
        let data = std::fs::read(path)?;
        self.process_bytes(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{MockOcr, OcrError};
    use image::{DynamicImage, ImageBuffer, Rgb};
    use std::io::Cursor;

    fn label_png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgb([200u8, 200u8, 200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    struct FailingOcr;

    impl OcrEngine for FailingOcr {
        fn recognize(&self, _bitmap: &GrayImage) -> Result<String, OcrError> {
            Err(OcrError::Recognition("engine exploded".into()))
        }
    }

    #[test]
    fn corrects_misread_prefix_end_to_end() {
        let pipeline = LabelPipeline::new(
            MockOcr::new("SOME LABEL TEXT 1855747430248 MORE"),
            LabelConfig::default(),
        );
        let scan = pipeline.process_bytes(&label_png(100, 100)).unwrap();
        assert_eq!(scan.candidate.as_deref(), Some("1855747430248"));
        assert_eq!(scan.tracking_number.unwrap().as_str(), "1055747430248U");
    }

    #[test]
    fn short_run_passes_through_unmodified() {
        let pipeline =
            LabelPipeline::new(MockOcr::new("DPD 9988776655"), LabelConfig::default());
        let scan = pipeline.process_bytes(&label_png(100, 100)).unwrap();
        let number = scan.tracking_number.unwrap();
        assert_eq!(number.as_str(), "9988776655");
        assert!(!number.is_complete());
    }

    #[test]
    fn unreadable_label_yields_no_number() {
        let pipeline =
            LabelPipeline::new(MockOcr::new("no digits on this label"), LabelConfig::default());
        let scan = pipeline.process_bytes(&label_png(100, 100)).unwrap();
        assert!(scan.tracking_number.is_none());
        assert!(scan.candidate.is_none());
    }

    #[test]
    fn engine_failure_is_not_an_error() {
        let pipeline = LabelPipeline::new(FailingOcr, LabelConfig::default());
        let scan = pipeline.process_bytes(&label_png(100, 100)).unwrap();
        assert!(scan.tracking_number.is_none());
        assert_eq!(scan.ocr_text, "");
    }

    #[test]
    fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        std::fs::write(&path, label_png(100, 100)).unwrap();

        let pipeline =
            LabelPipeline::new(MockOcr::new("NR 1234567890123"), LabelConfig::default());
        let scan = pipeline.process_file(&path).unwrap();
        assert_eq!(scan.tracking_number.unwrap().as_str(), "1234567890123U");

        let missing = pipeline.process_file(&dir.path().join("absent.png"));
        assert!(matches!(missing, Err(PipelineError::Io(_))));
    }

    #[test]
    fn invalid_bytes_are_a_decode_error() {
        let pipeline = LabelPipeline::new(MockOcr::new(""), LabelConfig::default());
        let result = pipeline.process_bytes(b"definitely not an image");
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[test]
    fn diagnostic_images_match_configured_band() {
        let pipeline = LabelPipeline::new(MockOcr::new(""), LabelConfig::default());
        let scan = pipeline.process_bytes(&label_png(200, 100)).unwrap();
        assert_eq!(scan.original.width(), 200);
        assert_eq!(scan.original.height(), 100);
        assert_eq!(scan.binarized.width(), 200);
        // floor(100 * 0.18) rows survive the crop.
        assert_eq!(scan.binarized.height(), 18);
    }
}
