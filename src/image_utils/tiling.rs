use crate::error::ConfigError;
use itertools::Itertools;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

const TILE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Reads the tile ordinal out of a tile name such as `0_7.png`.
///
/// The ordinal is the text between the first `_` and the following `.`. Only the file name is
/// inspected, so directories containing underscores or dots do not interfere. Returns `None`
/// when either marker is missing or the text is not a non-negative integer.
pub fn parse_tile_index(tile_name: &str) -> Option<u32> {
    let file_name = Path::new(tile_name).file_name()?.to_str()?;
    let (_, after_separator) = file_name.split_once('_')?;
    let (number, _) = after_separator.split_once('.')?;
    number.parse::<u32>().ok()
}

/// Like [`parse_tile_index`], but falls back to ordinal 0 for names it cannot read.
///
/// The fallback cannot be told apart from a genuine tile 0, so it is logged.
pub fn locate_tile(tile_name: &str) -> u32 {
    match parse_tile_index(tile_name) {
        Some(index) => index,
        None => {
            warn!(tile = tile_name, "could not read tile ordinal from name, using 0");
            0
        }
    }
}

/// Global x offset of a tile. Tiles are laid out along one horizontal axis with a fixed pitch.
pub fn global_offset(tile_index: u32, step_size: u32) -> i32 {
    let offset = i64::from(tile_index) * i64::from(step_size);
    i32::try_from(offset).unwrap_or(i32::MAX)
}

fn is_tile_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Lists the tile images directly inside `input_dir`, ordered by tile ordinal then name.
pub fn discover_tiles(input_dir: &Path) -> Result<Vec<String>, ConfigError> {
    if !input_dir.is_dir() {
        return Err(ConfigError::MissingInputDir(input_dir.to_path_buf()));
    }
    let mut names = Vec::new();
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_tile_image(entry.path()) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    let names = names
        .into_iter()
        .sorted_by(|a, b| {
            let key_a = (parse_tile_index(a).unwrap_or(0), a);
            let key_b = (parse_tile_index(b).unwrap_or(0), b);
            key_a.cmp(&key_b)
        })
        .collect_vec();
    debug!(count = names.len(), dir = ?input_dir, "discovered tiles");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn ordinal_is_between_separator_and_extension() {
        assert_eq!(parse_tile_index("3_7.png"), Some(7));
        assert_eq!(parse_tile_index("0_10.png"), Some(10));
        assert_eq!(locate_tile("3_7.png"), 7);
    }

    #[test]
    fn only_file_name_is_inspected() {
        assert_eq!(parse_tile_index("my_images/0_5.png"), Some(5));
        assert_eq!(parse_tile_index("./images.v2/0_6.png"), Some(6));
    }

    #[test]
    fn unreadable_names_fall_back_to_zero() {
        assert_eq!(parse_tile_index("tile.png"), None);
        assert_eq!(parse_tile_index("0_7"), None);
        assert_eq!(parse_tile_index("0_x.png"), None);
        assert_eq!(parse_tile_index("0_-1.png"), None);
        assert_eq!(locate_tile("tile.png"), 0);
        assert_eq!(locate_tile("0_abc.png"), 0);
    }

    #[test]
    fn offsets_follow_step() {
        assert_eq!(global_offset(0, 320), 0);
        assert_eq!(global_offset(1, 320), 320);
        assert_eq!(global_offset(15, 320), 4800);
        assert_eq!(global_offset(u32::MAX, 320), i32::MAX);
    }

    #[test]
    fn discovery_orders_by_ordinal() {
        let dir =
            std::env::temp_dir().join(format!("defect_stitcher_tiles_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for name in ["0_10.png", "0_2.png", "0_1.jpg", "notes.txt"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        let tiles = discover_tiles(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();
        assert_eq!(tiles, vec!["0_1.jpg", "0_2.png", "0_10.png"]);
    }

    #[test]
    fn discovery_requires_directory() {
        let missing = Path::new("./definitely/not/here");
        assert!(matches!(
            discover_tiles(missing),
            Err(ConfigError::MissingInputDir(_))
        ));
    }
}
