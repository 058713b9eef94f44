use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::annotations::point::Point;
use image::{RgbImage, imageops};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::filter::gaussian_blur_f32;

/// Sigma matching a 5x5 Gaussian kernel with automatic sigma.
const BLUR_SIGMA: f32 = 1.1;

/// Traces the outline of a defect inside a detector box.
///
/// Implementations clip the box to the tile first. Returned points are relative to the top-left
/// corner of the clipped box, and the result is empty when there is nothing to trace.
pub trait ShapeExtractor: Sync {
    fn extract(&self, tile: &RgbImage, local_box: &BoundingBox) -> Vec<Point>;
}

/// Separates a dark defect from a lighter background with an Otsu threshold and keeps the
/// largest outer contour.
#[derive(Clone, Copy, Debug, Default)]
pub struct OtsuContourExtractor;

impl ShapeExtractor for OtsuContourExtractor {
    fn extract(&self, tile: &RgbImage, local_box: &BoundingBox) -> Vec<Point> {
        let tile_bounds = match BoundingBox::new(0, 0, tile.width() as i32, tile.height() as i32) {
            Ok(b) => b,
            Err(_) => return vec![],
        };
        let clipped = match local_box.intersection(&tile_bounds) {
            Some(b) if b.area() > 0 => b,
            _ => return vec![],
        };
        let roi = imageops::crop_imm(
            tile,
            clipped.left() as u32,
            clipped.top() as u32,
            clipped.width() as u32,
            clipped.height() as u32,
        )
        .to_image();
        let gray = gaussian_blur_f32(&imageops::grayscale(&roi), BLUR_SIGMA);
        let binary = threshold(&gray, otsu_level(&gray), ThresholdType::BinaryInverted);

        let outer = find_contours::<i32>(&binary)
            .into_iter()
            .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer);
        match largest_contour(outer) {
            Some(contour) => compress_straight_runs(&contour),
            None => vec![],
        }
    }
}

/// Shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    (twice_area as f64 / 2.0).abs()
}

fn largest_contour(contours: impl Iterator<Item = Contour<i32>>) -> Option<Vec<Point>> {
    let mut best: Option<(f64, Vec<Point>)> = None;
    for contour in contours {
        let points: Vec<Point> = contour.points.iter().map(|p| Point::new(p.x, p.y)).collect();
        let area = polygon_area(&points);
        // First contour wins ties, including a run of zero-area contours.
        match &best {
            Some((best_area, _)) if area <= *best_area => {}
            _ => best = Some((area, points)),
        }
    }
    best.map(|(_, points)| points)
}

/// Keeps only the end points of horizontal, vertical and diagonal runs.
pub fn compress_straight_runs(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let step = |a: &Point, b: &Point| ((b.x - a.x).signum(), (b.y - a.y).signum());
    let n = points.len();
    (0..n)
        .filter(|&i| {
            let prev = &points[(i + n - 1) % n];
            let next = &points[(i + 1) % n];
            step(prev, &points[i]) != step(&points[i], next)
        })
        .map(|i| points[i])
        .collect()
}
