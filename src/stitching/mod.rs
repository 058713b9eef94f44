//! Tile stitching: per tile detection, global aggregation, cross tile merging and defect
//! assembly.

pub mod aggregator;
pub mod report;
pub mod tile_stage;

use crate::config::StitchConfig;
use crate::error::StitchError;
use crate::image_utils::contour::ShapeExtractor;
use crate::image_utils::image_io::TileLoader;
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::object_detection_utils::non_maximum_suppression;
use aggregator::collect_candidates;
use report::{Defect, assemble_defects};
use std::sync::Mutex;
use tracing::{debug, info};

/// Detects defects on a row of overlapping tiles and reports them once, in global coordinates.
pub struct TileStitcher<D, S> {
    detector: Mutex<D>,
    extractor: S,
    config: StitchConfig,
}

impl<D, S> TileStitcher<D, S>
where
    D: ObjectDetectionModel + Send,
    S: ShapeExtractor,
{
    pub fn new(detector: D, extractor: S, config: StitchConfig) -> Self {
        TileStitcher {
            detector: Mutex::new(detector),
            extractor,
            config,
        }
    }

    /// Runs every tile, then merges duplicates across the whole set.
    ///
    /// Tiles that fail to load are skipped. An empty tile list gives an empty result.
    pub fn run<L: TileLoader>(
        &self,
        tiles: &[String],
        loader: &L,
    ) -> Result<Vec<Defect>, StitchError> {
        let global = collect_candidates(
            tiles,
            loader,
            &self.detector,
            &self.extractor,
            &self.config,
        )?;
        info!(
            candidates = global.candidates.len(),
            tiles_processed = global.tiles_processed,
            tiles_skipped = global.tiles_skipped,
            "merging overlapping defects"
        );
        let survivors = non_maximum_suppression(
            global.candidates,
            self.config.score_threshold,
            self.config.nms_threshold,
        );
        let defects = assemble_defects(survivors);
        for defect in &defects {
            debug!("{defect}");
        }
        info!(defects = defects.len(), "merge complete");
        Ok(defects)
    }
}
