use crate::error::DetectorError;
use image::RgbImage;
use ndarray::Array3;

/// Defines a trait that all object detection models must follow.
///
/// A model takes one tile at native resolution and returns its raw output tensor, shaped
/// `[1, a, b]`. Interpreting that tensor is left to the decoder, so the row count and stride
/// are whatever the loaded model produces.
///
/// `run_inference` takes `&mut self` because inference sessions are not assumed to be
/// re-entrant. Callers that fan tiles out across threads share a model behind a mutex.
pub trait ObjectDetectionModel {
    /// The (width, height) the model expects. Decoded coordinates live in this space.
    fn input_size(&self) -> (u32, u32);

    fn run_inference(&mut self, tile: &RgbImage) -> Result<Array3<f32>, DetectorError>;
}
