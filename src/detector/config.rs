use serde::{Deserialize, Serialize};

use super::DetectionError;
use super::annotate::{count_label, label_extent};
use super::region::AreaBand;

const BLUR_KERNEL_SIZE: u32 = 5;
const ADAPTIVE_BLOCK_SIZE: u32 = 11;
const ADAPTIVE_BIAS: f64 = 2.0;
const MORPH_KERNEL_SIZE: u32 = 3;
const MIN_AREA: f64 = 30.0;
const MAX_AREA: f64 = 10_000.0;
const OVERLAY_COLOR: [u8; 3] = [0, 255, 0];
const OVERLAY_TEXT_COLOR: [u8; 3] = [255, 0, 0];
const LABEL_ORIGIN: [u32; 2] = [10, 10];
const LABEL_SCALE: u32 = 2;

/// Configuration parameters for cell detection.
///
/// Controls smoothing, the adaptive threshold, morphology, the accepted area
/// band and the overlay colors. Colors are RGB. Every field has a default so
/// partial JSON documents deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub blur_kernel_size: u32,
    /// Derived from `blur_kernel_size` when `None`.
    pub blur_sigma: Option<f64>,
    pub adaptive_block_size: u32,
    pub adaptive_bias: f64,
    pub morph_kernel_size: u32,
    /// Exclusive lower bound, squared pixels.
    pub min_area: f64,
    /// Exclusive upper bound, squared pixels.
    pub max_area: f64,
    pub overlay_color: [u8; 3],
    pub overlay_text_color: [u8; 3],
    pub label_origin: [u32; 2],
    pub label_scale: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: BLUR_KERNEL_SIZE,
            blur_sigma: None,
            adaptive_block_size: ADAPTIVE_BLOCK_SIZE,
            adaptive_bias: ADAPTIVE_BIAS,
            morph_kernel_size: MORPH_KERNEL_SIZE,
            min_area: MIN_AREA,
            max_area: MAX_AREA,
            overlay_color: OVERLAY_COLOR,
            overlay_text_color: OVERLAY_TEXT_COLOR,
            label_origin: LABEL_ORIGIN,
            label_scale: LABEL_SCALE,
        }
    }
}

impl DetectorConfig {
    pub fn area_band(&self) -> AreaBand {
        AreaBand::new(self.min_area, self.max_area)
    }

    /// Rejects parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), DetectionError> {
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(invalid(format!(
                "blur_kernel_size must be odd and positive, got {}",
                self.blur_kernel_size
            )));
        }
        if let Some(sigma) = self.blur_sigma
            && !(sigma.is_finite() && sigma > 0.0)
        {
            return Err(invalid(format!("blur_sigma must be positive, got {sigma}")));
        }
        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(invalid(format!(
                "adaptive_block_size must be odd and at least 3, got {}",
                self.adaptive_block_size
            )));
        }
        if !self.adaptive_bias.is_finite() {
            return Err(invalid("adaptive_bias must be finite".to_string()));
        }
        if self.morph_kernel_size == 0 {
            return Err(invalid("morph_kernel_size must be positive".to_string()));
        }
        if !(self.min_area.is_finite() && self.min_area >= 0.0) {
            return Err(invalid(format!(
                "min_area must be a non-negative number, got {}",
                self.min_area
            )));
        }
        if !self.max_area.is_finite() || self.max_area <= self.min_area {
            return Err(invalid(format!(
                "max_area ({}) must be greater than min_area ({})",
                self.max_area, self.min_area
            )));
        }
        if self.label_scale == 0 {
            return Err(invalid("label_scale must be positive".to_string()));
        }
        let [x, y] = self.label_origin;
        if i32::try_from(x).is_err() || i32::try_from(y).is_err() {
            return Err(invalid(format!(
                "label_origin must not exceed {}, got [{x}, {y}]",
                i32::MAX
            )));
        }
        // The widest label belongs to the largest count.
        if label_extent(&count_label(u32::MAX), self).is_none() {
            return Err(invalid(format!(
                "label_scale {} at label_origin [{x}, {y}] does not fit in pixel coordinates",
                self.label_scale
            )));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> DetectionError {
    DetectionError::InvalidConfiguration(reason)
}
