use image::{self, ImageResult, RgbImage};
use std::path::{Path, PathBuf};

pub fn read_image_as_rgb8(filepath: &Path) -> ImageResult<RgbImage> {
    Ok(image::open(filepath)?.into_rgb8())
}

/// Something that can turn a tile name from the manifest into pixels.
///
/// A failed load is not fatal; the caller skips the tile.
pub trait TileLoader: Sync {
    fn load(&self, tile_name: &str) -> ImageResult<RgbImage>;
}

/// Loads tiles from files relative to a base directory.
pub struct FileTileLoader {
    input_dir: PathBuf,
}

impl FileTileLoader {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        FileTileLoader {
            input_dir: input_dir.into(),
        }
    }

    pub fn resolve(&self, tile_name: &str) -> PathBuf {
        self.input_dir.join(tile_name)
    }
}

impl TileLoader for FileTileLoader {
    fn load(&self, tile_name: &str) -> ImageResult<RgbImage> {
        read_image_as_rgb8(&self.resolve(tile_name))
    }
}
