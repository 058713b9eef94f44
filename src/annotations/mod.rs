pub mod bounding_box;
pub mod defect_outline;
pub mod detection;
pub mod point;
