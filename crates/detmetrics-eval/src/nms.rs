//! Non-maximum suppression
//!
//! Greedy, class-aware deduplication of overlapping candidates: the best-scoring box of
//! each overlapping same-class cluster survives, boxes of other classes never suppress
//! each other.

use crate::iou::intersection_over_union;
use crate::order::by_score_desc;
use crate::traits::NonMaxSuppression;
use detmetrics_core::{BoxFormat, Candidate, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thresholds for a suppression pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NmsConfig {
    /// Same-class boxes overlapping a kept box by more than this are dropped
    pub iou_threshold: f64,
    /// Boxes scoring at or below this are discarded before selection
    pub score_threshold: f64,
    pub box_format: BoxFormat,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.5,
            score_threshold: 0.0,
            box_format: BoxFormat::Corners,
        }
    }
}

impl NmsConfig {
    pub fn new(iou_threshold: f64, score_threshold: f64, box_format: BoxFormat) -> Self {
        Self {
            iou_threshold,
            score_threshold,
            box_format,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(Error::invalid(format!(
                "nms iou_threshold must lie in [0, 1], got {}",
                self.iou_threshold
            )));
        }
        if self.score_threshold.is_nan() {
            return Err(Error::invalid("nms score_threshold is NaN"));
        }
        Ok(())
    }

    /// Validate the thresholds, then suppress
    pub fn apply<C: Candidate + Clone>(&self, boxes: &[C]) -> Result<Vec<C>> {
        self.validate()?;
        Ok(non_max_suppression(
            boxes,
            self.iou_threshold,
            self.score_threshold,
            self.box_format,
        ))
    }
}

impl NonMaxSuppression for NmsConfig {
    fn apply_nms<C: Candidate + Clone>(&self, boxes: &[C]) -> Result<Vec<C>> {
        self.apply(boxes)
    }
}

/// Greedy non-max suppression.
///
/// Candidates with `score <= score_threshold` are dropped first. The rest are visited
/// from highest to lowest score; each visited box is kept and every remaining box of the
/// same class whose IoU with it exceeds `iou_threshold` is removed. The output is in
/// descending score order, ties keeping their input order.
pub fn non_max_suppression<C: Candidate + Clone>(
    boxes: &[C],
    iou_threshold: f64,
    score_threshold: f64,
    format: BoxFormat,
) -> Vec<C> {
    let mut candidates: Vec<&C> = boxes
        .iter()
        .filter(|b| b.score() > score_threshold)
        .collect();
    candidates.sort_by(|a, b| by_score_desc(a.score(), b.score()));

    let filtered = candidates.len();
    let mut suppressed = vec![false; candidates.len()];
    let mut keep = Vec::new();

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }

        let chosen = candidates[i];
        keep.push(chosen.clone());

        for j in (i + 1)..candidates.len() {
            if suppressed[j] || candidates[j].class_id() != chosen.class_id() {
                continue;
            }
            let iou = intersection_over_union(chosen.bbox(), candidates[j].bbox(), format);
            if iou > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    debug!(
        input = boxes.len(),
        above_score = filtered,
        kept = keep.len(),
        "non-max suppression finished"
    );

    keep
}
