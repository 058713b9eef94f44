use crate::error::AnnotationError;
use std::fmt;

/// A struct representing an axis aligned bounding box in integer pixel coordinates.
///
/// Detections coming out of the decoder are scaled into tile pixels and rounded, then shifted
/// into the frame of the full stitched image. Boxes are stored as an origin plus a size, the
/// same way the detector reports them, and the size is never negative.
///
/// This project uses the standard convention of the left side of the image being x=0 and the top
/// of the image being y=0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

impl BoundingBox {
    /// Checks if a box has valid parameters before constructing.
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Result<Self, AnnotationError> {
        if width < 0 {
            Err(AnnotationError::NegativeWidth(width))
        } else if height < 0 {
            Err(AnnotationError::NegativeHeight(height))
        } else {
            Ok(BoundingBox {
                left,
                top,
                width,
                height,
            })
        }
    }

    /// Returns the same box moved by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> BoundingBox {
        BoundingBox {
            left: self.left.saturating_add(dx),
            top: self.top.saturating_add(dy),
            ..*self
        }
    }

    /// The overlapping region of two boxes, or `None` when they share no area.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(BoundingBox {
            left,
            top,
            width: right - left,
            height: bottom - top,
        })
    }

    pub fn as_xywh(&self) -> [i32; 4] {
        [self.left, self.top, self.width, self.height]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox {{ x: {}, y: {}, w: {}, h: {} }}",
            self.left, self.top, self.width, self.height
        )
    }
}

/// Geometry shared by every annotation that is, or wraps, a bounding box.
///
/// Non maximum suppression only needs this trait, so it works the same on bare boxes and on
/// boxes that carry an outline polygon.
pub trait BoundingBoxGeometry {
    fn left(&self) -> i32;
    fn top(&self) -> i32;
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    fn right(&self) -> i32 {
        self.left().saturating_add(self.width())
    }

    fn bottom(&self) -> i32 {
        self.top().saturating_add(self.height())
    }

    fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.height())
    }

    /// Intersection area over union area. Two empty boxes have an IoU of 0.
    fn intersection_over_union<U: BoundingBoxGeometry>(&self, other: &U) -> f32 {
        let overlap_w = i64::from(self.right().min(other.right()))
            - i64::from(self.left().max(other.left()));
        let overlap_h = i64::from(self.bottom().min(other.bottom()))
            - i64::from(self.top().max(other.top()));
        if overlap_w <= 0 || overlap_h <= 0 {
            return 0.0;
        }
        let intersection = overlap_w * overlap_h;
        let union = self.area() + other.area() - intersection;
        if union <= 0 {
            return 0.0;
        }
        (intersection as f64 / union as f64) as f32
    }
}

impl BoundingBoxGeometry for BoundingBox {
    fn left(&self) -> i32 {
        self.left
    }

    fn top(&self) -> i32 {
        self.top
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_negative_size() {
        assert_eq!(
            BoundingBox::new(0, 0, -1, 4),
            Err(AnnotationError::NegativeWidth(-1))
        );
        assert_eq!(
            BoundingBox::new(0, 0, 4, -2),
            Err(AnnotationError::NegativeHeight(-2))
        );
        assert!(BoundingBox::new(-5, -5, 0, 0).is_ok());
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = BoundingBox::new(10, 10, 20, 20).unwrap();
        assert_relative_eq!(a.intersection_over_union(&a), 1.0);
    }

    #[test]
    fn iou_half_overlap() {
        let a = BoundingBox::new(300, 0, 60, 60).unwrap();
        let b = BoundingBox::new(320, 0, 60, 60).unwrap();
        assert_relative_eq!(a.intersection_over_union(&b), 0.5);
        assert_relative_eq!(b.intersection_over_union(&a), 0.5);
    }

    #[test]
    fn iou_disjoint_and_touching_is_zero() {
        let a = BoundingBox::new(0, 0, 10, 10).unwrap();
        let touching = BoundingBox::new(10, 0, 10, 10).unwrap();
        let far = BoundingBox::new(100, 100, 5, 5).unwrap();
        assert_eq!(a.intersection_over_union(&touching), 0.0);
        assert_eq!(a.intersection_over_union(&far), 0.0);
    }

    #[test]
    fn iou_of_empty_boxes_is_zero() {
        let a = BoundingBox::new(3, 3, 0, 0).unwrap();
        assert_eq!(a.intersection_over_union(&a), 0.0);
    }

    #[test]
    fn intersection_clips_to_bounds() {
        let tile = BoundingBox::new(0, 0, 640, 480).unwrap();
        let spill = BoundingBox::new(-10, 470, 30, 30).unwrap();
        assert_eq!(
            spill.intersection(&tile),
            Some(BoundingBox::new(0, 470, 20, 10).unwrap())
        );
        let outside = BoundingBox::new(700, 0, 10, 10).unwrap();
        assert_eq!(outside.intersection(&tile), None);
    }

    #[test]
    fn translated_moves_origin_only() {
        let b = BoundingBox::new(1, 2, 3, 4).unwrap().translated(320, 0);
        assert_eq!(b.as_xywh(), [321, 2, 3, 4]);
    }
}
