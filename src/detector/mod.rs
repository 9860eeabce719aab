//! Cell detection pipeline.
//!
//! grayscale → gaussian blur → adaptive inverse threshold → erode/dilate →
//! external boundaries → area band → annotation. Every stage allocates a
//! fresh buffer; nothing here performs I/O or logging.

pub mod annotate;
pub mod blur;
pub mod config;
pub mod contours;
mod glyphs;
pub mod grayscale;
pub mod morphology;
pub mod region;
pub mod threshold;

use image::{DynamicImage, GrayImage, RgbImage};
use kornia::image::ImageError;

pub use config::DetectorConfig;
pub use region::{AreaBand, RegionRecord};

/// Coarse classification of a [`DetectionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidImage,
    InvalidConfiguration,
}

/// Errors that can occur during cell detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("kornia image error: {0}")]
    Kornia(#[from] ImageError),
}

impl DetectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectionError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            DetectionError::InvalidImage(_) | DetectionError::Kornia(_) => ErrorKind::InvalidImage,
        }
    }
}

/// Result of counting cells in one image.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub count: u32,
    pub annotated: RgbImage,
    /// Accepted regions, in boundary extraction order.
    pub regions: Vec<RegionRecord>,
}

/// Intermediate rasters of a single pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineStages {
    pub grayscale: GrayImage,
    pub smoothed: GrayImage,
    pub binary: GrayImage,
    pub cleaned: GrayImage,
}

/// A detection result together with the stages that produced it.
#[derive(Debug, Clone)]
pub struct DetectionTrace {
    pub result: DetectionResult,
    pub stages: PipelineStages,
}

/// Counts cells in `image` and returns the count with an annotated copy.
///
/// The input is never modified. Zero-sized images are rejected with
/// [`DetectionError::InvalidImage`].
pub fn detect(image: &DynamicImage, config: &DetectorConfig) -> Result<DetectionResult, DetectionError> {
    trace(image, config).map(|t| t.result)
}

/// Same as [`detect`] but also hands back every intermediate raster.
pub fn trace(image: &DynamicImage, config: &DetectorConfig) -> Result<DetectionTrace, DetectionError> {
    config.validate()?;

    let rgb = image.to_rgb8();
    let gray = grayscale::luma(&rgb)?;
    let smoothed = blur::gaussian_blur(&gray, config.blur_kernel_size, config.blur_sigma);
    let binary = threshold::adaptive_threshold_inv(
        &smoothed,
        config.adaptive_block_size,
        config.adaptive_bias,
    );
    let cleaned = morphology::separate(&binary, config.morph_kernel_size);

    let regions = count_regions(&cleaned, &config.area_band());
    let count = u32::try_from(regions.len()).unwrap_or(u32::MAX);
    let annotated = annotate::annotate(&rgb, &regions, count, config);

    Ok(DetectionTrace {
        result: DetectionResult {
            count,
            annotated,
            regions,
        },
        stages: PipelineStages {
            grayscale: gray,
            smoothed,
            binary,
            cleaned,
        },
    })
}

/// Extracts external boundaries from a binary mask and keeps those whose
/// enclosed area lies strictly inside `band`.
pub fn count_regions(mask: &GrayImage, band: &AreaBand) -> Vec<RegionRecord> {
    contours::external_boundaries(mask)
        .into_iter()
        .map(RegionRecord::measure)
        .filter(|record| band.contains(record.area))
        .collect()
}
