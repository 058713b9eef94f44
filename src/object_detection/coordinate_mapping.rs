use crate::annotations::bounding_box::{BoundingBox, BoundingBoxGeometry};
use crate::annotations::defect_outline::DefectOutline;
use crate::annotations::point::Point;
use crate::error::AnnotationError;
use crate::image_utils::tiling::global_offset;
use crate::object_detection::yolo_decoder::RawDetection;

/// Factors taking model input coordinates to tile pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    pub x: f32,
    pub y: f32,
}

impl ScaleFactors {
    pub fn new(tile_width: u32, tile_height: u32, input_width: u32, input_height: u32) -> Self {
        ScaleFactors {
            x: tile_width as f32 / input_width as f32,
            y: tile_height as f32 / input_height as f32,
        }
    }
}

/// Rescales a decoded center/size box into a tile-local pixel box.
pub fn to_tile_box(
    raw: &RawDetection,
    factors: ScaleFactors,
) -> Result<BoundingBox, AnnotationError> {
    let left = ((raw.center_x - 0.5 * raw.width) * factors.x).round() as i32;
    let top = ((raw.center_y - 0.5 * raw.height) * factors.y).round() as i32;
    let width = (raw.width * factors.x).round() as i32;
    let height = (raw.height * factors.y).round() as i32;
    BoundingBox::new(left, top, width, height)
}

/// Moves a tile-local box and its outline into the global frame.
///
/// The outline comes back from the shape extractor relative to the box origin, so its points
/// get the box origin added before the tile offset.
pub fn to_global(
    local_box: &BoundingBox,
    local_polygon: &[Point],
    tile_index: u32,
    step_size: u32,
) -> DefectOutline {
    let offset = global_offset(tile_index, step_size);
    let bounding_box = local_box.translated(offset, 0);
    let polygon = local_polygon
        .iter()
        .map(|p| p.translated(local_box.left().saturating_add(offset), local_box.top()))
        .collect();
    DefectOutline::new(bounding_box, polygon, tile_index)
}
