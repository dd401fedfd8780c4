//! OCR engine contract
//!
//! The pipeline treats character recognition as an external collaborator:
//! anything that can turn a binarized band into text. Engine state is
//! expensive to set up, so implementations are constructed once and shared
//! read-only across invocations.

use image::GrayImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to initialize OCR engine: {0}")]
    Init(String),
    #[error("failed to load image into OCR engine: {0}")]
    ImageLoad(String),
    #[error("text recognition failed: {0}")]
    Recognition(String),
    #[error("Tesseract not available — build with the `tesseract` feature")]
    NotAvailable,
}

/// Contract for the external character-recognition collaborator.
///
/// Implementations take the binarized band and return whatever text they
/// can read — possibly empty, with no structural guarantees beyond being
/// a string. The pipeline calls `recognize` synchronously; implementations
/// must be safe to share across threads.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, bitmap: &GrayImage) -> Result<String, OcrError>;
}

// ── Mock engine (always available, used for tests and wiring) ─────────────────

/// Returns a pre-set string regardless of input, so the full pipeline can
/// run without a system Tesseract install.
pub struct MockOcr {
    pub text: String,
}

impl MockOcr {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrEngine for MockOcr {
    fn recognize(&self, _bitmap: &GrayImage) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Tesseract engine (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract {
    use std::io::Cursor;
    use std::sync::Mutex;

    use image::GrayImage;
    use leptess::{LepTess, Variable};

    use super::{OcrEngine, OcrError};

    /// Characters the engine may emit; the label prints digits and
    /// uppercase letters only.
    const CHAR_WHITELIST: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Page segmentation mode 7: treat the band as a single text line.
    const PAGE_SEG_MODE: &str = "7";

    /// Tesseract-backed engine. The underlying instance is created once
    /// and reused for every call; Tesseract itself is not thread-safe, so
    /// calls serialize on an internal lock.
    pub struct TesseractOcr {
        inner: Mutex<LepTess>,
    }

    impl TesseractOcr {
        /// `data_path` points at the tessdata directory (`None` uses the
        /// system default), `lang` is the trained language to load.
        pub fn new(data_path: Option<&str>, lang: &str) -> Result<Self, OcrError> {
            let mut lt =
                LepTess::new(data_path, lang).map_err(|e| OcrError::Init(e.to_string()))?;
            lt.set_variable(Variable::TesseditCharWhitelist, CHAR_WHITELIST)
                .map_err(|e| OcrError::Init(e.to_string()))?;
            lt.set_variable(Variable::TesseditPagesegMode, PAGE_SEG_MODE)
                .map_err(|e| OcrError::Init(e.to_string()))?;
            Ok(Self {
                inner: Mutex::new(lt),
            })
        }
    }

    impl OcrEngine for TesseractOcr {
        fn recognize(&self, bitmap: &GrayImage) -> Result<String, OcrError> {
            // leptess wants an encoded image, so round-trip through an
            // in-memory PNG.
            let mut png = Vec::new();
            bitmap
                .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
                .map_err(|e| OcrError::ImageLoad(e.to_string()))?;

            let mut lt = self
                .inner
                .lock()
                .map_err(|_| OcrError::Recognition("engine lock poisoned".into()))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| OcrError::ImageLoad(e.to_string()))?;
            lt.get_utf8_text()
                .map_err(|e| OcrError::Recognition(e.to_string()))
        }
    }
}
