//! Separable gaussian smoothing with reflect-101 borders.

use image::GrayImage;

// Binomial kernels used for the small sizes when no sigma is given.
const KERNEL_1: [f64; 1] = [1.0];
const KERNEL_3: [f64; 3] = [0.25, 0.5, 0.25];
const KERNEL_5: [f64; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];
const KERNEL_7: [f64; 7] = [
    0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
];

/// Sigma implied by a kernel size when none is given.
pub fn derived_sigma(size: u32) -> f64 {
    0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Builds a normalized 1-D gaussian kernel of `size` taps.
pub fn gaussian_kernel(size: u32, sigma: Option<f64>) -> Vec<f64> {
    let sigma = match sigma {
        Some(s) if s > 0.0 => s,
        _ => match size {
            1 => return KERNEL_1.to_vec(),
            3 => return KERNEL_3.to_vec(),
            5 => return KERNEL_5.to_vec(),
            7 => return KERNEL_7.to_vec(),
            _ => derived_sigma(size),
        },
    };

    let center = (size as f64 - 1.0) * 0.5;
    let scale = -0.5 / (sigma * sigma);
    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= sum;
    }
    kernel
}

/// Maps an out-of-range coordinate back into `0..len` by mirroring around the
/// edge sample without repeating it (`dcb|abcd|cba`).
pub fn reflect_101(mut pos: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    loop {
        if pos < 0 {
            pos = -pos;
        } else if pos > last {
            pos = 2 * last - pos;
        } else {
            return pos as usize;
        }
    }
}

/// Convolves `src` with `kernel` along both axes and returns the unrounded
/// result in row-major order.
pub fn filter_separable(src: &GrayImage, kernel: &[f64]) -> Vec<f64> {
    let (width, height) = src.dimensions();
    let (width, height) = (width as usize, height as usize);
    let anchor = (kernel.len() / 2) as isize;
    let pixels = src.as_raw();

    let mut rows = vec![0f64; width * height];
    for y in 0..height {
        let line = &pixels[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0f64;
            for (k, &w) in kernel.iter().enumerate() {
                let sx = reflect_101(x as isize + k as isize - anchor, width);
                acc += w * line[sx] as f64;
            }
            rows[y * width + x] = acc;
        }
    }

    let mut out = vec![0f64; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0f64;
            for (k, &w) in kernel.iter().enumerate() {
                let sy = reflect_101(y as isize + k as isize - anchor, height);
                acc += w * rows[sy * width + x];
            }
            out[y * width + x] = acc;
        }
    }
    out
}

pub(crate) fn to_gray(width: u32, height: u32, values: &[f64]) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let v = values[y as usize * width as usize + x as usize];
        image::Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Gaussian blur with a `size`×`size` kernel. Output has the input's
/// dimensions.
pub fn gaussian_blur(src: &GrayImage, size: u32, sigma: Option<f64>) -> GrayImage {
    let kernel = gaussian_kernel(size, sigma);
    let values = filter_separable(src, &kernel);
    to_gray(src.width(), src.height(), &values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernels_are_normalized() {
        for size in [1, 3, 5, 7, 9, 11, 21] {
            let kernel = gaussian_kernel(size, None);
            assert_eq!(kernel.len(), size as usize);
            let sum: f64 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "size {size} sums to {sum}");
        }
    }

    #[test]
    fn larger_kernels_get_wider_sigma() {
        assert!(derived_sigma(11) > derived_sigma(5));
        assert!((derived_sigma(11) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn explicit_sigma_overrides_table() {
        let kernel = gaussian_kernel(5, Some(3.0));
        assert_ne!(kernel, KERNEL_5.to_vec());
        assert!(kernel[0] < kernel[2]);
    }

    #[test]
    fn reflect_mirrors_without_repeating_edge() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-7, 2), 1);
        assert_eq!(reflect_101(4, 1), 0);
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let src = GrayImage::from_pixel(9, 7, image::Luma([123]));
        let out = gaussian_blur(&src, 5, None);
        assert_eq!(out, src);
    }

    #[test]
    fn impulse_spreads_symmetrically() {
        let mut src = GrayImage::new(9, 9);
        src.put_pixel(4, 4, image::Luma([255]));
        let out = gaussian_blur(&src, 3, None);
        assert_eq!(out.get_pixel(3, 4), out.get_pixel(5, 4));
        assert_eq!(out.get_pixel(4, 3), out.get_pixel(4, 5));
        assert!(out.get_pixel(4, 4)[0] > out.get_pixel(3, 4)[0]);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
    }
}
