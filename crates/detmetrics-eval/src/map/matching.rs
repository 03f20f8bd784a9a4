//! Greedy detection to ground-truth matching for a single class

use crate::iou::intersection_over_union;
use crate::order::by_score_desc;
use detmetrics_core::{BoxFormat, Detection, GroundTruth};
use std::collections::HashMap;
use tracing::trace;

/// Ground truths of one class, grouped per image, with a claim marker per box
pub(crate) struct ImageGroundTruths<'a> {
    boxes: HashMap<u64, Vec<&'a GroundTruth>>,
    claimed: HashMap<u64, Vec<bool>>,
}

impl<'a> ImageGroundTruths<'a> {
    pub(crate) fn new(ground_truths: &[&'a GroundTruth]) -> Self {
        let mut boxes: HashMap<u64, Vec<&'a GroundTruth>> = HashMap::new();
        for &gt in ground_truths {
            boxes.entry(gt.image_id).or_default().push(gt);
        }
        let claimed = boxes
            .iter()
            .map(|(&image_id, gts)| (image_id, vec![false; gts.len()]))
            .collect();

        Self { boxes, claimed }
    }

    /// Index and IoU of the best-overlapping box in `image_id`, if any overlaps at all
    fn best_match(&self, detection: &Detection, format: BoxFormat) -> Option<(usize, f64)> {
        let candidates = self.boxes.get(&detection.image_id)?;
        let mut best: Option<(usize, f64)> = None;
        let mut best_iou = 0.0;

        for (idx, gt) in candidates.iter().enumerate() {
            let iou = intersection_over_union(&detection.bbox, &gt.bbox, format);
            if iou > best_iou {
                best_iou = iou;
                best = Some((idx, iou));
            }
        }

        best
    }

    /// Claim a box; false when an earlier detection already holds it
    fn claim(&mut self, image_id: u64, idx: usize) -> bool {
        match self.claimed.get_mut(&image_id).and_then(|c| c.get_mut(idx)) {
            Some(taken) if !*taken => {
                *taken = true;
                true
            }
            _ => false,
        }
    }
}

/// Classify each detection of one class as true (`true`) or false positive.
///
/// Detections are visited by descending score and the returned flags follow that order.
/// A detection is a true positive when its best-overlapping ground truth in the same
/// image exceeds `iou_threshold` and has not been claimed yet; duplicates of an already
/// found object are false positives.
pub(crate) fn match_detections(
    detections: &[&Detection],
    ground_truths: &[&GroundTruth],
    iou_threshold: f64,
    format: BoxFormat,
) -> Vec<bool> {
    let mut sorted = detections.to_vec();
    sorted.sort_by(|a, b| by_score_desc(a.score, b.score));

    let mut images = ImageGroundTruths::new(ground_truths);

    sorted
        .iter()
        .map(|det| {
            let is_tp = match images.best_match(det, format) {
                Some((idx, iou)) if iou > iou_threshold => images.claim(det.image_id, idx),
                _ => false,
            };
            trace!(
                image_id = det.image_id,
                class_id = det.class_id,
                score = det.score,
                is_tp,
                "matched detection"
            );
            is_tp
        })
        .collect()
}
