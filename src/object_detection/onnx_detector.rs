use crate::error::DetectorError;
use crate::image_utils::image_conversion::tile_to_model_input;
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use image::RgbImage;
use ndarray::Array3;
use ort::value::Tensor;
use ort::{inputs, session::SessionOutputs};
use std::path::Path;
use tracing::debug;

/// A YOLO style single output detector exported to ONNX.
pub struct OnnxDetector {
    ort_session: OrtInferenceSession,
    input_width: u32,
    input_height: u32,
}

impl OnnxDetector {
    pub fn new(
        model_path: &Path,
        input_width: u32,
        input_height: u32,
    ) -> Result<Self, DetectorError> {
        let ort_session = OrtInferenceSession::new(model_path)?;
        Ok(OnnxDetector {
            ort_session,
            input_width,
            input_height,
        })
    }
}

/// Reads an output tensor as `[1, a, b]`. Rank 2 outputs get the batch axis added back.
fn output_to_array3(shape: &[i64], data: &[f32]) -> Result<Array3<f32>, DetectorError> {
    let bad_shape = || DetectorError::OutputShape(shape.to_vec());
    if shape.iter().any(|d| *d < 0) {
        return Err(bad_shape());
    }
    let dims: Vec<usize> = shape.iter().map(|d| *d as usize).collect();
    let dims = match dims.as_slice() {
        [a, b] => (1, *a, *b),
        [n, a, b] => (*n, *a, *b),
        _ => return Err(bad_shape()),
    };
    Array3::from_shape_vec(dims, data.to_vec()).map_err(|_| bad_shape())
}

impl ObjectDetectionModel for OnnxDetector {
    fn input_size(&self) -> (u32, u32) {
        (self.input_width, self.input_height)
    }

    fn run_inference(&mut self, tile: &RgbImage) -> Result<Array3<f32>, DetectorError> {
        let input_array = tile_to_model_input(tile, self.input_width, self.input_height);
        let input_tensor = Tensor::from_array(input_array)?;
        let outputs: SessionOutputs = self
            .ort_session
            .session
            .run(inputs![self.ort_session.input_name.as_str() => input_tensor])?;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        debug!(shape = ?&shape[..], "model output");
        output_to_array3(&shape[..], data)
    }
}
