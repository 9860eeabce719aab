use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use super::config::DetectorConfig;
use super::contours::Boundary;
use super::glyphs::{self, GLYPH_ADVANCE, GLYPH_HEIGHT};
use super::region::RegionRecord;

pub fn count_label(count: u32) -> String {
    format!("Total Cells: {count}")
}

/// Draws each accepted boundary and the count label onto a copy of `original`.
pub fn annotate(
    original: &RgbImage,
    regions: &[RegionRecord],
    count: u32,
    config: &DetectorConfig,
) -> RgbImage {
    let mut canvas = original.clone();
    let outline = Rgb(config.overlay_color);
    for region in regions {
        draw_boundary(&mut canvas, &region.boundary, outline);
    }
    draw_label(&mut canvas, &count_label(count), config);
    canvas
}

/// Rectangle covered by the label text, before clipping to the image.
///
/// `None` when the label's far edge is not representable in `i32` pixel
/// coordinates.
pub fn label_extent(text: &str, config: &DetectorConfig) -> Option<Rect> {
    let scale = config.label_scale.max(1);
    let chars = u32::try_from(text.chars().count().max(1)).ok()?;
    let width = chars
        .checked_mul(GLYPH_ADVANCE)?
        .checked_sub(1)?
        .checked_mul(scale)?;
    let height = GLYPH_HEIGHT.checked_mul(scale)?;
    let [x, y] = config.label_origin;
    let left = i32::try_from(x).ok()?;
    let top = i32::try_from(y).ok()?;
    left.checked_add(i32::try_from(width).ok()?)?;
    top.checked_add(i32::try_from(height).ok()?)?;
    Some(Rect::at(left, top).of_size(width, height))
}

fn draw_boundary(canvas: &mut RgbImage, boundary: &Boundary, color: Rgb<u8>) {
    let points = &boundary.points;
    if let [only] = points.as_slice() {
        if only.x >= 0
            && only.y >= 0
            && (only.x as u32) < canvas.width()
            && (only.y as u32) < canvas.height()
        {
            canvas.put_pixel(only.x as u32, only.y as u32, color);
        }
        return;
    }
    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        draw_line_segment_mut(
            canvas,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            color,
        );
    }
}

fn draw_label(canvas: &mut RgbImage, text: &str, config: &DetectorConfig) {
    // Every offset below stays inside the extent once it fits.
    let Some(extent) = label_extent(text, config) else {
        return;
    };
    let color = Rgb(config.overlay_text_color);
    let scale = config.label_scale.max(1);
    let step = (GLYPH_ADVANCE * scale) as i32;
    for (i, c) in text.chars().enumerate() {
        let glyph_x = extent.left() + i as i32 * step;
        for (col, row) in glyphs::lit_pixels(c) {
            let rect = Rect::at(
                glyph_x + (col * scale) as i32,
                extent.top() + (row * scale) as i32,
            )
            .of_size(scale, scale);
            draw_filled_rect_mut(canvas, rect, color);
        }
    }
}
