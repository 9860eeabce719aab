use image::{GrayImage, RgbImage};
use kornia::{
    image::{Image, ImageSize, allocator::CpuAllocator},
    imgproc,
};

use super::DetectionError;

type CpuImage<T, const C: usize> = Image<T, C, CpuAllocator>;

/// Converts an RGB raster to 8-bit luma.
pub fn luma(rgb: &RgbImage) -> Result<GrayImage, DetectionError> {
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(DetectionError::InvalidImage(format!(
            "image has zero dimension ({width}x{height})"
        )));
    }

    let image = CpuImage::<u8, 3>::new(
        ImageSize {
            width: width as usize,
            height: height as usize,
        },
        rgb.as_raw().clone(),
        CpuAllocator,
    )?;
    let mut gray = CpuImage::<u8, 1>::from_size_val(image.size(), 0u8, CpuAllocator)?;
    imgproc::color::gray_from_rgb_u8(&image, &mut gray)?;

    GrayImage::from_raw(width, height, gray.as_slice().to_vec()).ok_or_else(|| {
        DetectionError::InvalidImage(format!("luma buffer does not match {width}x{height}"))
    })
}
