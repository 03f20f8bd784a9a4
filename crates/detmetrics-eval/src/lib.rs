//! Detmetrics evaluation library
//!
//! Intersection-over-Union, non-max suppression and mean average precision over
//! in-memory detections and ground-truth boxes.

pub mod config;
pub mod iou;
pub mod loader;
pub mod map;
pub mod nms;
mod order;

// Re-export commonly used types
pub use config::{EvalConfig, ZeroGroundTruthPolicy};
pub use iou::{intersection_over_union, iou_batch, iou_matrix, EPSILON};
pub use map::{
    evaluate, mean_average_precision, mean_average_precision_range, ClassReport, MapReport,
    PrecisionRecallCurve,
};
pub use nms::{non_max_suppression, NmsConfig};

pub use detmetrics_core::{
    BBox, BoxFormat, Candidate, Detection, Error, GroundTruth, Result, ScoredBox,
};

/// Core traits for the evaluation routines
pub mod traits {
    use super::*;

    /// Trait for non-maximum suppression implementations
    pub trait NonMaxSuppression {
        fn apply_nms<C: Candidate + Clone>(&self, boxes: &[C]) -> Result<Vec<C>>;
    }
}
