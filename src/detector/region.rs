use super::contours::{Boundary, polygon_area};

/// Exclusive area band, `min < area < max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaBand {
    pub min: f64,
    pub max: f64,
}

impl AreaBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, area: f64) -> bool {
        self.min < area && area < self.max
    }
}

/// A boundary measured once, reused for filtering and reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub boundary: Boundary,
    pub area: f64,
}

impl RegionRecord {
    pub fn measure(boundary: Boundary) -> Self {
        let area = polygon_area(&boundary.points);
        Self { boundary, area }
    }
}
