use crate::annotations::defect_outline::Candidate;
use crate::config::StitchConfig;
use crate::error::StitchError;
use crate::image_utils::contour::ShapeExtractor;
use crate::image_utils::image_io::TileLoader;
use crate::image_utils::tiling::locate_tile;
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::stitching::tile_stage::detect_tile;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::Mutex;
use tracing::{info, warn};

/// Every candidate from every tile, in tile list order.
///
/// Built only once all tiles are done, so merging always sees the complete set.
#[derive(Debug, Default)]
pub struct GlobalCandidates {
    pub candidates: Vec<Candidate>,
    pub tiles_processed: usize,
    pub tiles_skipped: usize,
}

impl GlobalCandidates {
    /// Flattens per tile results. `None` marks a tile that could not be loaded.
    pub fn from_tile_results(results: Vec<Option<Vec<Candidate>>>) -> Self {
        let mut global = GlobalCandidates::default();
        for result in results {
            match result {
                Some(candidates) => {
                    global.tiles_processed += 1;
                    global.candidates.extend(candidates);
                }
                None => global.tiles_skipped += 1,
            }
        }
        global
    }
}

fn process_tile<D, S, L>(
    tile_name: &str,
    loader: &L,
    detector: &Mutex<D>,
    extractor: &S,
    config: &StitchConfig,
) -> Result<Option<Vec<Candidate>>, StitchError>
where
    D: ObjectDetectionModel,
    S: ShapeExtractor,
    L: TileLoader,
{
    let tile = match loader.load(tile_name) {
        Ok(tile) => tile,
        Err(err) => {
            warn!(tile = tile_name, error = %err, "skipping tile");
            return Ok(None);
        }
    };
    let tile_index = locate_tile(tile_name);
    let candidates = detect_tile(detector, extractor, config, tile_name, tile_index, &tile)?;
    info!(
        tile = tile_name,
        tile_index,
        candidates = candidates.len(),
        "tile processed"
    );
    Ok(Some(candidates))
}

/// Processes every tile and gathers the results.
///
/// Tiles run in parallel with the `parallel` feature. Results are collected in tile list
/// order either way. The first fatal error stops the run.
pub fn collect_candidates<D, S, L>(
    tiles: &[String],
    loader: &L,
    detector: &Mutex<D>,
    extractor: &S,
    config: &StitchConfig,
) -> Result<GlobalCandidates, StitchError>
where
    D: ObjectDetectionModel + Send,
    S: ShapeExtractor,
    L: TileLoader,
{
    #[cfg(feature = "parallel")]
    let tile_iter = tiles.par_iter();
    #[cfg(not(feature = "parallel"))]
    let tile_iter = tiles.iter();

    let results = tile_iter
        .map(|tile_name| process_tile(tile_name, loader, detector, extractor, config))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GlobalCandidates::from_tile_results(results))
}
