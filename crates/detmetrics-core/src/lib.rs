//! Detmetrics core types
//!
//! Value types shared by the evaluation routines: box encodings, scored boxes,
//! detections and ground-truth annotations.

pub mod boxes;
pub mod error;

pub use boxes::{BBox, BoxFormat, Candidate, Detection, GroundTruth, ScoredBox};
pub use error::{Error, Result};
