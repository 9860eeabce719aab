//! Binary erosion and dilation with a square structuring element.
//!
//! Pixels outside the image are ignored: a foreground blob touching the
//! border is not eroded from that side.

use image::GrayImage;

/// Shrinks foreground: a pixel survives only if its whole window is set.
pub fn erode(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    window_extreme(mask, kernel_size, u8::min)
}

/// Grows foreground: a pixel is set if anything in its window is set.
pub fn dilate(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    window_extreme(mask, kernel_size, u8::max)
}

/// One erosion followed by one dilation. Severs bridges thinner than the
/// kernel and restores the size of what remains.
pub fn separate(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    dilate(&erode(mask, kernel_size), kernel_size)
}

// The square window is separable, so the extreme is taken along rows then
// columns.
fn window_extreme(mask: &GrayImage, kernel_size: u32, pick: fn(u8, u8) -> u8) -> GrayImage {
    let (width, height) = mask.dimensions();
    let (w, h) = (width as usize, height as usize);
    let before = (kernel_size / 2) as usize;
    let after = (kernel_size as usize).saturating_sub(1) - before;
    let src = mask.as_raw();

    let mut rows = vec![0u8; w * h];
    for y in 0..h {
        let line = &src[y * w..(y + 1) * w];
        for x in 0..w {
            let lo = x.saturating_sub(before);
            let hi = (x + after).min(w - 1);
            rows[y * w + x] = line[lo..=hi]
                .iter()
                .copied()
                .reduce(pick)
                .unwrap_or(line[x]);
        }
    }

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        let lo = y.saturating_sub(before);
        let hi = (y + after).min(h - 1);
        for x in 0..w {
            let mut acc = rows[lo * w + x];
            for sy in lo + 1..=hi {
                acc = pick(acc, rows[sy * w + x]);
            }
            out[y * w + x] = acc;
        }
    }

    GrayImage::from_raw(width, height, out).unwrap_or_else(|| GrayImage::new(width, height))
}
