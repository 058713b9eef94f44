pub mod coordinate_mapping;
pub mod object_detection_model;
pub mod object_detection_utils;
pub mod onnx_detector;
pub mod ort_inference_session;
pub mod yolo_decoder;
