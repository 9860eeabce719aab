use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;

/// Closed outer boundary of one connected foreground region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub points: Vec<Point<i32>>,
}

/// Outer borders of the top-level foreground components of `mask`.
///
/// Holes and anything nested inside a hole are skipped. Points are
/// chain-compressed, see [`compress_chain`].
pub fn external_boundaries(mask: &GrayImage) -> Vec<Boundary> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Boundary {
            points: compress_chain(&c.points),
        })
        .collect()
}

/// Drops every point that continues the horizontal, vertical or diagonal run
/// it sits on, keeping only the points where the direction changes.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            step(prev, cur) != step(cur, next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        vec![points[0]]
    } else {
        kept
    }
}

fn step(from: Point<i32>, to: Point<i32>) -> (i32, i32) {
    ((to.x - from.x).signum(), (to.y - from.y).signum())
}

/// Shoelace area of the closed polygon through `points`.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    (twice as f64 * 0.5).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn p(x: i32, y: i32) -> Point<i32> {
        Point::new(x, y)
    }

    #[test]
    fn square_compresses_to_corners() {
        let mut mask = GrayImage::new(10, 10);
        for y in 2..7 {
            for x in 3..8 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        let boundaries = external_boundaries(&mask);
        assert_eq!(boundaries.len(), 1);
        let mut corners = boundaries[0].points.clone();
        corners.sort_by_key(|q| (q.y, q.x));
        assert_eq!(corners, vec![p(3, 2), p(7, 2), p(3, 6), p(7, 6)]);
        assert_eq!(polygon_area(&boundaries[0].points), 16.0);
    }

    #[test]
    fn holes_and_nested_blobs_are_not_extracted() {
        // 9x9 ring with a single pixel island in the middle of its hole.
        let mut mask = GrayImage::new(13, 13);
        for y in 2..11 {
            for x in 2..11 {
                let edge = x < 4 || x > 8 || y < 4 || y > 8;
                if edge {
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }
        mask.put_pixel(6, 6, Luma([255]));
        let boundaries = external_boundaries(&mask);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(polygon_area(&boundaries[0].points), 64.0);
    }

    #[test]
    fn separate_blobs_give_separate_boundaries() {
        let mut mask = GrayImage::new(20, 8);
        for y in 1..5 {
            for x in 1..5 {
                mask.put_pixel(x, y, Luma([255]));
                mask.put_pixel(x + 10, y, Luma([255]));
            }
        }
        assert_eq!(external_boundaries(&mask).len(), 2);
    }

    #[test]
    fn degenerate_polygons_have_no_area() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[p(1, 1)]), 0.0);
        assert_eq!(polygon_area(&[p(0, 0), p(4, 0)]), 0.0);
    }

    #[test]
    fn area_ignores_orientation() {
        let cw = [p(0, 0), p(4, 0), p(4, 3), p(0, 3)];
        let ccw = [p(0, 0), p(0, 3), p(4, 3), p(4, 0)];
        assert_eq!(polygon_area(&cw), 12.0);
        assert_eq!(polygon_area(&ccw), 12.0);
    }

    #[test]
    fn compression_keeps_direction_changes_only() {
        let chain = [p(0, 0), p(1, 0), p(2, 0), p(2, 1), p(2, 2), p(1, 1)];
        assert_eq!(compress_chain(&chain), vec![p(0, 0), p(2, 0), p(2, 2)]);
    }
}
