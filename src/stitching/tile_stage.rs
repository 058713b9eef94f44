use crate::annotations::defect_outline::Candidate;
use crate::annotations::detection::Detection;
use crate::config::StitchConfig;
use crate::error::{DetectorError, StitchError};
use crate::image_utils::contour::ShapeExtractor;
use crate::object_detection::coordinate_mapping::{ScaleFactors, to_global, to_tile_box};
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::yolo_decoder::decode_detections;
use image::RgbImage;
use std::sync::Mutex;
use tracing::debug;

/// Runs the detector on one tile and maps everything it finds into the global frame.
///
/// Only the inference call holds the detector lock. Decoding, outline extraction and mapping run
/// unlocked so other tiles can use the model meanwhile.
pub fn detect_tile<D: ObjectDetectionModel, S: ShapeExtractor>(
    detector: &Mutex<D>,
    extractor: &S,
    config: &StitchConfig,
    tile_name: &str,
    tile_index: u32,
    tile: &RgbImage,
) -> Result<Vec<Candidate>, StitchError> {
    let (output, (input_width, input_height)) = {
        let mut model = detector.lock().map_err(|_| DetectorError::Poisoned)?;
        (model.run_inference(tile)?, model.input_size())
    };
    let raw_detections = decode_detections(
        output.view(),
        config.output_layout,
        config.score_threshold,
    )
    .map_err(|source| StitchError::Decode {
        tile: tile_name.to_string(),
        source,
    })?;

    let factors = ScaleFactors::new(tile.width(), tile.height(), input_width, input_height);
    let mut candidates = Vec::with_capacity(raw_detections.len());
    for raw in &raw_detections {
        let local_box = match to_tile_box(raw, factors) {
            Ok(b) => b,
            Err(err) => {
                debug!(tile = tile_name, error = %err, "dropping degenerate detection");
                continue;
            }
        };
        let local_polygon = extractor.extract(tile, &local_box);
        candidates.push(Detection {
            annotation: to_global(&local_box, &local_polygon, tile_index, config.step_size),
            confidence: raw.confidence,
        });
    }
    Ok(candidates)
}
