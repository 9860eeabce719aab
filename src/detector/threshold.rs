use image::{GrayImage, Luma};

use super::blur;

/// Inverse adaptive threshold against a gaussian-weighted local mean.
///
/// A pixel becomes foreground (255) when its value is at or below the mean of
/// its `block_size`×`block_size` neighbourhood minus `bias`, so regions darker
/// than their surroundings light up regardless of global illumination.
pub fn adaptive_threshold_inv(src: &GrayImage, block_size: u32, bias: f64) -> GrayImage {
    let kernel = blur::gaussian_kernel(block_size, None);
    let means = blur::to_gray(
        src.width(),
        src.height(),
        &blur::filter_separable(src, &kernel),
    );

    let mut out = GrayImage::new(src.width(), src.height());
    for ((value, mean), dst) in src.pixels().zip(means.pixels()).zip(out.pixels_mut()) {
        let threshold = mean[0] as f64 - bias;
        *dst = if value[0] as f64 <= threshold {
            Luma([255])
        } else {
            Luma([0])
        };
    }
    out
}
