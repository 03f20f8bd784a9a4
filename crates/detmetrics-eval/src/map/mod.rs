//! Mean average precision
//!
//! Per class: detections are matched greedily against the ground truths of their image,
//! the resulting true/false positive sequence becomes a precision-recall curve and its
//! trapezoidal area is the class AP. The mAP is the plain mean over classes.

pub mod curve;
mod matching;

pub use curve::{CurvePoint, PrecisionRecallCurve};

use crate::config::{EvalConfig, ZeroGroundTruthPolicy};
use detmetrics_core::{BoxFormat, Detection, GroundTruth, Result};
use matching::match_detections;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-class evaluation outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class_id: usize,
    pub num_ground_truths: usize,
    pub num_detections: usize,
    /// Mean of `ap_per_threshold`
    pub average_precision: f64,
    pub ap_per_threshold: Vec<f64>,
    pub true_positives: Vec<usize>,
}

impl ClassReport {
    pub fn false_positives(&self) -> Vec<usize> {
        self.true_positives
            .iter()
            .map(|tp| self.num_detections - tp)
            .collect()
    }
}

/// Dataset-level evaluation outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapReport {
    pub mean_average_precision: f64,
    pub iou_thresholds: Vec<f64>,
    pub box_format: BoxFormat,
    pub zero_ground_truth: ZeroGroundTruthPolicy,
    /// Classes that contributed to the mean
    pub evaluated_classes: usize,
    /// Classes that occur in the records, by class id
    pub classes: Vec<ClassReport>,
}

/// IoU thresholds 0.50, 0.55, ..., 0.95
pub fn coco_thresholds() -> Vec<f64> {
    (0..10).map(|i| 0.5 + 0.05 * i as f64).collect()
}

/// Mean average precision at a single IoU threshold.
///
/// Records whose class id is not below `num_classes` are ignored. Classes without any
/// ground truth are left out of the mean; when no class is left the result is 0.
pub fn mean_average_precision(
    detections: &[Detection],
    ground_truths: &[GroundTruth],
    iou_threshold: f64,
    format: BoxFormat,
    num_classes: usize,
) -> f64 {
    mean_average_precision_range(
        detections,
        ground_truths,
        &[iou_threshold],
        format,
        num_classes,
    )
}

/// Mean average precision averaged over several IoU thresholds
pub fn mean_average_precision_range(
    detections: &[Detection],
    ground_truths: &[GroundTruth],
    iou_thresholds: &[f64],
    format: BoxFormat,
    num_classes: usize,
) -> f64 {
    let classes = class_reports(detections, ground_truths, iou_thresholds, format, num_classes);
    mean_over_classes(&classes, ZeroGroundTruthPolicy::Skip, num_classes).0
}

/// Validated evaluation driven by an [`EvalConfig`], with per-class detail
pub fn evaluate(
    detections: &[Detection],
    ground_truths: &[GroundTruth],
    config: &EvalConfig,
) -> Result<MapReport> {
    config.validate()?;

    let iou_thresholds = config.thresholds();
    let classes = class_reports(
        detections,
        ground_truths,
        &iou_thresholds,
        config.box_format,
        config.num_classes,
    );
    let (mean, evaluated_classes) =
        mean_over_classes(&classes, config.zero_ground_truth, config.num_classes);

    debug!(
        map = mean,
        evaluated_classes,
        num_classes = config.num_classes,
        "evaluation finished"
    );

    Ok(MapReport {
        mean_average_precision: mean,
        iou_thresholds,
        box_format: config.box_format,
        zero_ground_truth: config.zero_ground_truth,
        evaluated_classes,
        classes,
    })
}

/// Mean AP and the number of classes it averages over.
///
/// `classes` only holds classes that had at least one record; under
/// [`ZeroGroundTruthPolicy::Zero`] every absent class still counts with an AP of 0.
fn mean_over_classes(
    classes: &[ClassReport],
    policy: ZeroGroundTruthPolicy,
    num_classes: usize,
) -> (f64, usize) {
    let (total, counted) = match policy {
        ZeroGroundTruthPolicy::Skip => {
            let scored: Vec<f64> = classes
                .iter()
                .filter(|c| c.num_ground_truths > 0)
                .map(|c| c.average_precision)
                .collect();
            (scored.iter().sum::<f64>(), scored.len())
        }
        ZeroGroundTruthPolicy::Zero => (
            classes.iter().map(|c| c.average_precision).sum::<f64>(),
            num_classes,
        ),
    };

    if counted == 0 {
        return (0.0, 0);
    }
    (total / counted as f64, counted)
}

type ClassBucket<'a> = (Vec<&'a Detection>, Vec<&'a GroundTruth>);

/// Reports for the classes below `num_classes` that occur in the records, by class id
fn class_reports<'a>(
    detections: &'a [Detection],
    ground_truths: &'a [GroundTruth],
    iou_thresholds: &[f64],
    format: BoxFormat,
    num_classes: usize,
) -> Vec<ClassReport> {
    let mut buckets: BTreeMap<usize, ClassBucket<'a>> = BTreeMap::new();
    let mut ignored = 0usize;

    for det in detections {
        if det.class_id < num_classes {
            buckets.entry(det.class_id).or_default().0.push(det);
        } else {
            ignored += 1;
        }
    }
    for gt in ground_truths {
        if gt.class_id < num_classes {
            buckets.entry(gt.class_id).or_default().1.push(gt);
        } else {
            ignored += 1;
        }
    }
    if ignored > 0 {
        debug!(ignored, num_classes, "records with out-of-range class ids ignored");
    }

    let buckets: Vec<(usize, ClassBucket<'a>)> = buckets.into_iter().collect();
    let score = |entry: &(usize, ClassBucket<'a>)| {
        let (class_id, (dets, gts)) = entry;
        score_class(*class_id, dets, gts, iou_thresholds, format)
    };

    #[cfg(feature = "parallel")]
    let reports = buckets.par_iter().map(score).collect();

    #[cfg(not(feature = "parallel"))]
    let reports = buckets.iter().map(score).collect();

    reports
}

fn score_class(
    class_id: usize,
    detections: &[&Detection],
    ground_truths: &[&GroundTruth],
    iou_thresholds: &[f64],
    format: BoxFormat,
) -> ClassReport {
    let mut ap_per_threshold = Vec::with_capacity(iou_thresholds.len());
    let mut true_positives = Vec::with_capacity(iou_thresholds.len());

    for &threshold in iou_thresholds {
        let flags = match_detections(detections, ground_truths, threshold, format);
        let curve = PrecisionRecallCurve::from_flags(&flags, ground_truths.len());
        ap_per_threshold.push(curve.average_precision());
        true_positives.push(flags.iter().filter(|&&tp| tp).count());
    }

    let average_precision = if ap_per_threshold.is_empty() {
        0.0
    } else {
        ap_per_threshold.iter().sum::<f64>() / ap_per_threshold.len() as f64
    };

    debug!(
        class_id,
        detections = detections.len(),
        ground_truths = ground_truths.len(),
        ap = average_precision,
        "scored class"
    );

    ClassReport {
        class_id,
        num_ground_truths: ground_truths.len(),
        num_detections: detections.len(),
        average_precision,
        ap_per_threshold,
        true_positives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perfect_set() -> (Vec<Detection>, Vec<GroundTruth>) {
        let gts = vec![
            GroundTruth::new(0, 0, [0.0, 0.0, 10.0, 10.0]),
            GroundTruth::new(0, 1, [20.0, 20.0, 30.0, 30.0]),
            GroundTruth::new(1, 0, [5.0, 5.0, 15.0, 15.0]),
            GroundTruth::new(1, 0, [40.0, 40.0, 60.0, 60.0]),
        ];
        let dets = gts
            .iter()
            .enumerate()
            .map(|(i, gt)| Detection::new(gt.image_id, gt.class_id, 0.9 - 0.1 * i as f64, gt.bbox))
            .collect();
        (dets, gts)
    }

    #[test]
    fn test_perfect_detections() {
        let (dets, gts) = perfect_set();
        let map = mean_average_precision(&dets, &gts, 0.5, BoxFormat::Corners, 20);
        assert!((map - 1.0).abs() < 1e-4, "map = {map}");
    }

    #[test]
    fn test_empty_detections() {
        let (_, gts) = perfect_set();
        assert_eq!(mean_average_precision(&[], &gts, 0.5, BoxFormat::Corners, 20), 0.0);
    }

    #[test]
    fn test_empty_everything() {
        assert_eq!(mean_average_precision(&[], &[], 0.5, BoxFormat::Corners, 20), 0.0);
        assert_eq!(mean_average_precision(&[], &[], 0.5, BoxFormat::Corners, 0), 0.0);
    }

    #[test]
    fn test_duplicate_detection() {
        let gts = vec![GroundTruth::new(0, 0, [0.0, 0.0, 10.0, 10.0])];
        let dets = vec![
            Detection::new(0, 0, 0.9, [0.0, 0.0, 10.0, 10.0]),
            Detection::new(0, 0, 0.8, [0.0, 0.0, 10.0, 10.0]),
        ];
        let report = evaluate(&dets, &gts, &EvalConfig::default()).unwrap();
        let class = &report.classes[0];
        assert_eq!(class.true_positives, vec![1]);
        assert_eq!(class.false_positives(), vec![1]);
        // (0,1) -> (1,1) -> (1,.5): the trailing FP adds no area
        assert!((report.mean_average_precision - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_false_positive_first() {
        let gts = vec![GroundTruth::new(0, 0, [0.0, 0.0, 10.0, 10.0])];
        let dets = vec![
            Detection::new(0, 0, 0.9, [50.0, 50.0, 60.0, 60.0]),
            Detection::new(0, 0, 0.8, [0.0, 0.0, 10.0, 10.0]),
        ];
        let map = mean_average_precision(&dets, &gts, 0.5, BoxFormat::Corners, 1);
        assert!((map - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_zero_ground_truth_policy() {
        let gts = vec![GroundTruth::new(0, 0, [0.0, 0.0, 10.0, 10.0])];
        let dets = vec![
            Detection::new(0, 0, 0.9, [0.0, 0.0, 10.0, 10.0]),
            Detection::new(0, 1, 0.9, [0.0, 0.0, 10.0, 10.0]),
        ];

        let skip = EvalConfig {
            num_classes: 2,
            ..Default::default()
        };
        let report = evaluate(&dets, &gts, &skip).unwrap();
        assert_eq!(report.evaluated_classes, 1);
        assert!((report.mean_average_precision - 1.0).abs() < 1e-4);

        let zero = EvalConfig {
            num_classes: 2,
            zero_ground_truth: ZeroGroundTruthPolicy::Zero,
            ..Default::default()
        };
        let report = evaluate(&dets, &gts, &zero).unwrap();
        assert_eq!(report.evaluated_classes, 2);
        assert!((report.mean_average_precision - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_huge_class_count() {
        let gts = vec![GroundTruth::new(0, 3, [0.0, 0.0, 10.0, 10.0])];
        let dets = vec![Detection::new(0, 3, 0.9, [0.0, 0.0, 10.0, 10.0])];
        let config = EvalConfig {
            num_classes: usize::MAX,
            ..Default::default()
        };

        let report = evaluate(&dets, &gts, &config).unwrap();
        assert_eq!(report.classes.len(), 1);
        assert_eq!(report.classes[0].class_id, 3);
        assert!((report.mean_average_precision - 1.0).abs() < 1e-4);

        let report = evaluate(&[], &gts, &config).unwrap();
        assert_eq!(report.mean_average_precision, 0.0);
    }

    #[test]
    fn test_zero_policy_counts_absent_classes() {
        let gts = vec![GroundTruth::new(0, 0, [0.0, 0.0, 10.0, 10.0])];
        let dets = vec![Detection::new(0, 0, 0.9, [0.0, 0.0, 10.0, 10.0])];
        let config = EvalConfig {
            num_classes: 4,
            zero_ground_truth: ZeroGroundTruthPolicy::Zero,
            ..Default::default()
        };

        let report = evaluate(&dets, &gts, &config).unwrap();
        assert_eq!(report.classes.len(), 1);
        assert_eq!(report.evaluated_classes, 4);
        assert!((report.mean_average_precision - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_range_classes_ignored() {
        let gts = vec![
            GroundTruth::new(0, 0, [0.0, 0.0, 10.0, 10.0]),
            GroundTruth::new(0, 7, [0.0, 0.0, 10.0, 10.0]),
        ];
        let dets = vec![Detection::new(0, 0, 0.9, [0.0, 0.0, 10.0, 10.0])];
        let map = mean_average_precision(&dets, &gts, 0.5, BoxFormat::Corners, 2);
        assert!((map - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_midpoint_matches_corners() {
        let (dets, gts) = perfect_set();
        let mid = |b: detmetrics_core::BBox| b.convert(BoxFormat::Corners, BoxFormat::Midpoint);
        let dets_mid: Vec<Detection> = dets
            .iter()
            .map(|d| Detection { bbox: mid(d.bbox), ..*d })
            .collect();
        let gts_mid: Vec<GroundTruth> = gts
            .iter()
            .map(|g| GroundTruth { bbox: mid(g.bbox), ..*g })
            .collect();

        let corners = mean_average_precision(&dets, &gts, 0.5, BoxFormat::Corners, 2);
        let midpoint = mean_average_precision(&dets_mid, &gts_mid, 0.5, BoxFormat::Midpoint, 2);
        assert!((corners - midpoint).abs() < 1e-9);
    }

    #[test]
    fn test_range_averages_thresholds() {
        // IoU ~0.68: counted at 0.5..0.65, missed from 0.7 up
        let gts = vec![GroundTruth::new(0, 0, [0.0, 0.0, 10.0, 10.0])];
        let dets = vec![Detection::new(0, 0, 0.9, [1.0, 1.0, 11.0, 11.0])];
        let thresholds = coco_thresholds();
        let map = mean_average_precision_range(&dets, &gts, &thresholds, BoxFormat::Corners, 1);
        assert!((map - 0.4).abs() < 1e-4, "map = {map}");
    }

    #[test]
    fn test_evaluate_rejects_bad_config() {
        let config = EvalConfig {
            iou_threshold: -0.1,
            ..Default::default()
        };
        assert!(evaluate(&[], &[], &config).is_err());
    }
}
