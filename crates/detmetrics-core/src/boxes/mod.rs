//! Bounding box encodings and detection records

pub mod bbox;
pub mod format;
pub mod records;

pub use bbox::BBox;
pub use format::BoxFormat;
pub use records::{Candidate, Detection, GroundTruth, ScoredBox};
