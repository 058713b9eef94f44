use std::path::PathBuf;
use thiserror::Error;

/// Raised when a geometric annotation would violate its own invariants.
#[derive(Debug, Error, PartialEq)]
pub enum AnnotationError {
    #[error("Failed to create BoundingBox, negative width ({0}).")]
    NegativeWidth(i32),
    #[error("Failed to create BoundingBox, negative height ({0}).")]
    NegativeHeight(i32),
}

/// Problems with the run configuration. All of these abort the run before any tile is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{name} must lie in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },
    #[error("model input size must be non-zero, got {width}x{height}")]
    ZeroInputSize { width: u32, height: u32 },
    #[error("input directory {0:?} does not exist or is not a directory")]
    MissingInputDir(PathBuf),
    #[error("failed to list input directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Detector failures. Any of these is fatal for the whole run.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("model file does not exist, or cannot be read: {0:?}")]
    MissingModel(PathBuf),
    #[error("onnxruntime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("model declares no inputs")]
    NoInputs,
    #[error("model output has unexpected shape {0:?}")]
    OutputShape(Vec<i64>),
    #[error("detector lock poisoned by a panicking worker")]
    Poisoned,
}

/// The raw output tensor could not be interpreted as candidate rows.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("expected a batch of exactly one tile, got {0}")]
    BatchSize(usize),
    #[error("each candidate row needs at least 5 attributes (cx, cy, w, h, score), got {0}")]
    StrideTooSmall(usize),
}

/// Top level pipeline error.
#[derive(Debug, Error)]
pub enum StitchError {
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error("failed to decode detector output for tile {tile}: {source}")]
    Decode { tile: String, source: DecodeError },
    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
