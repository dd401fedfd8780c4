//! Core pipeline for labeltrack
//!
//! This crate provides the deterministic processing stages for pulling a
//! parcel tracking number out of a photographed shipping label: bottom-band
//! cropping, contrast binarization, candidate search over noisy OCR text,
//! and rule-based correction into the canonical number format.
//!
//! Character recognition itself is an external collaborator, abstracted
//! behind [`ocr::OcrEngine`]. Everything here is pure and synchronous;
//! separate pipeline runs share no state and may execute in parallel.

pub mod candidate;
pub mod correct;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod types;

pub use candidate::find_candidate;
pub use correct::correct;
pub use ocr::{MockOcr, OcrEngine, OcrError};
pub use pipeline::{LabelPipeline, LabelScan, PipelineError};
pub use preprocess::{binarize, compute_image_hash, extract_bottom_band};
pub use types::{LabelConfig, TrackingNumber};
