use crate::error::ConfigError;
use crate::image_utils::tiling::discover_tiles;
use crate::object_detection::yolo_decoder::OutputLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_SIZE: u32 = 640;
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.15;
pub const DEFAULT_NMS_THRESHOLD: f32 = 0.4;
pub const DEFAULT_STEP_SIZE: u32 = 320;

/// Everything a stitching run needs to know.
///
/// Missing keys in a config file fall back to the defaults below.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct StitchConfig {
    /// Base directory tile names are resolved against.
    pub input_dir: PathBuf,
    /// Tile names to process, in order. `None` means every image in `input_dir`.
    pub tiles: Option<Vec<String>>,
    pub model_path: PathBuf,
    pub input_width: u32,
    pub input_height: u32,
    /// Candidates need a confidence strictly above this.
    pub score_threshold: f32,
    /// IoU at or above which the less confident of two candidates is dropped.
    pub nms_threshold: f32,
    /// Horizontal distance in pixels between the origins of consecutive tiles.
    pub step_size: u32,
    pub output_layout: OutputLayout,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            input_dir: "images".into(),
            tiles: None,
            model_path: "best.onnx".into(),
            input_width: DEFAULT_INPUT_SIZE,
            input_height: DEFAULT_INPUT_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            nms_threshold: DEFAULT_NMS_THRESHOLD,
            step_size: DEFAULT_STEP_SIZE,
            output_layout: OutputLayout::AttributesFirst,
        }
    }
}

impl StitchConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("score threshold", self.score_threshold),
            ("nms threshold", self.nms_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if self.input_width == 0 || self.input_height == 0 {
            return Err(ConfigError::ZeroInputSize {
                width: self.input_width,
                height: self.input_height,
            });
        }
        Ok(())
    }

    /// The ordered list of tiles for this run.
    pub fn tile_manifest(&self) -> Result<Vec<String>, ConfigError> {
        match &self.tiles {
            Some(tiles) => Ok(tiles.clone()),
            None => discover_tiles(&self.input_dir),
        }
    }
}
