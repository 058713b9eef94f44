use crate::error::DetectorError;
use ort::session::Session;
use std::path::Path;
use tracing::info;

/// An onnxruntime inference session.
///
/// The detector is a thin wrapper around an ONNX inference session that handles running the
/// model on hardware. Failing to build the session is fatal for a run.
pub struct OrtInferenceSession {
    pub session: Session,
    pub input_name: String,
}

impl OrtInferenceSession {
    pub fn new(model_path: &Path) -> Result<Self, DetectorError> {
        if !model_path.is_file() {
            return Err(DetectorError::MissingModel(model_path.to_path_buf()));
        }
        info!(model = ?model_path, "building onnxruntime session");
        let session = Session::builder()?.commit_from_file(model_path)?;
        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or(DetectorError::NoInputs)?;
        Ok(Self {
            session,
            input_name,
        })
    }
}
