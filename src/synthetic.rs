use image::{ImageResult, Rgb, RgbImage};
use std::path::Path;

const BACKGROUND: Rgb<u8> = Rgb([230, 200, 210]);
const CELL: Rgb<u8> = Rgb([150, 60, 90]);

/// A dark disk on the synthetic slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticCell {
    pub center: (f32, f32),
    pub radius: f32,
}

/// Description of a synthetic smear: a light background with darker disks
/// and an optional left-to-right illumination ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSpec {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub cell_color: Rgb<u8>,
    /// Brightness added at the right edge, scaled linearly from zero at the
    /// left edge.
    pub gradient: f32,
    pub cells: Vec<SyntheticCell>,
}

impl SlideSpec {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: BACKGROUND,
            cell_color: CELL,
            gradient: 0.0,
            cells: Vec::new(),
        }
    }

    /// A `cols`×`rows` lattice of equal cells, the first one centred at
    /// (`margin`, `margin`).
    pub fn grid(cols: u32, rows: u32, spacing: u32, margin: u32, radius: f32) -> Self {
        let width = 2 * margin + spacing * cols.saturating_sub(1);
        let height = 2 * margin + spacing * rows.saturating_sub(1);
        let mut spec = Self::new(width, height);
        for row in 0..rows {
            for col in 0..cols {
                spec.cells.push(SyntheticCell {
                    center: ((margin + col * spacing) as f32, (margin + row * spacing) as f32),
                    radius,
                });
            }
        }
        spec
    }

    pub fn with_gradient(mut self, gradient: f32) -> Self {
        self.gradient = gradient;
        self
    }

    pub fn render(&self) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, self.background);

        for cell in &self.cells {
            let (cx, cy) = cell.center;
            let r2 = cell.radius * cell.radius;
            let min_x = (cx - cell.radius).floor().max(0.0) as u32;
            let min_y = (cy - cell.radius).floor().max(0.0) as u32;
            let max_x = ((cx + cell.radius).ceil() as u32).min(self.width.saturating_sub(1));
            let max_y = ((cy + cell.radius).ceil() as u32).min(self.height.saturating_sub(1));
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let dx = x as f32 - cx;
                    let dy = y as f32 - cy;
                    if dx * dx + dy * dy <= r2 {
                        img.put_pixel(x, y, self.cell_color);
                    }
                }
            }
        }

        if self.gradient != 0.0 && self.width > 1 {
            let span = (self.width - 1) as f32;
            for (x, _, px) in img.enumerate_pixels_mut() {
                let lift = self.gradient * x as f32 / span;
                for channel in px.0.iter_mut() {
                    *channel = (*channel as f32 + lift).round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        img
    }

    pub fn save(&self, path: &Path) -> ImageResult<()> {
        self.render().save(path)
    }
}

/// Writes a small sample slide with a known number of cells and returns that
/// number.
pub fn write_sample_slide(path: &Path) -> ImageResult<usize> {
    let spec = SlideSpec::grid(6, 4, 48, 36, 9.0).with_gradient(30.0);
    spec.save(path)?;
    Ok(spec.cells.len())
}
