use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::annotations::detection::Detection;
use crate::annotations::point::Point;

/// A struct representing a BoundingBox + outline annotation for a single defect.
///
/// The detector only gives us a rectangle. The shape extractor traces the defect inside that
/// rectangle, so every candidate carries both: the box used for overlap tests and the polygon
/// reported downstream. Both are in global image coordinates once a candidate leaves its tile.
/// `tile_index` remembers which tile produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct DefectOutline {
    pub bounding_box: BoundingBox,
    pub polygon: Vec<Point>,
    pub tile_index: u32,
}

/// A detection proposal, already mapped into the global frame, waiting for cross tile merging.
pub type Candidate = Detection<DefectOutline>;

impl DefectOutline {
    pub fn new(bounding_box: BoundingBox, polygon: Vec<Point>, tile_index: u32) -> Self {
        DefectOutline {
            bounding_box,
            polygon,
            tile_index,
        }
    }
}

impl BoundingBoxGeometry for DefectOutline {
    fn left(&self) -> i32 {
        self.bounding_box.left()
    }

    fn top(&self) -> i32 {
        self.bounding_box.top()
    }

    fn width(&self) -> i32 {
        self.bounding_box.width()
    }

    fn height(&self) -> i32 {
        self.bounding_box.height()
    }
}
