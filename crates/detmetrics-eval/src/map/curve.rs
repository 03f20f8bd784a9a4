//! Precision-recall curves

use crate::iou::EPSILON;
use serde::{Deserialize, Serialize};

/// One point of a precision-recall curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub recall: f64,
    pub precision: f64,
}

/// Precision-recall curve of one class, anchored at `(recall 0, precision 1)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecallCurve {
    points: Vec<CurvePoint>,
}

impl PrecisionRecallCurve {
    /// Build from per-detection true-positive flags, in descending score order.
    ///
    /// Every flag that is not a true positive counts as a false positive.
    pub fn from_flags(true_positives: &[bool], num_ground_truths: usize) -> Self {
        let mut points = Vec::with_capacity(true_positives.len() + 1);
        points.push(CurvePoint {
            recall: 0.0,
            precision: 1.0,
        });

        let mut tp_cumsum = 0.0;
        let mut fp_cumsum = 0.0;
        for &is_tp in true_positives {
            if is_tp {
                tp_cumsum += 1.0;
            } else {
                fp_cumsum += 1.0;
            }
            points.push(CurvePoint {
                recall: tp_cumsum / (num_ground_truths as f64 + EPSILON),
                precision: tp_cumsum / (tp_cumsum + fp_cumsum + EPSILON),
            });
        }

        Self { points }
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Area under the curve by the trapezoidal rule over recall
    pub fn average_precision(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].recall - w[0].recall) * (w[1].precision + w[0].precision) / 2.0)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_only() {
        let curve = PrecisionRecallCurve::from_flags(&[], 3);
        assert_eq!(curve.points().len(), 1);
        assert_eq!(curve.average_precision(), 0.0);
    }

    #[test]
    fn test_all_true_positives() {
        let curve = PrecisionRecallCurve::from_flags(&[true, true, true, true], 4);
        assert!((curve.average_precision() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_mixed_flags() {
        // (0,1) -> (.5,1) -> (.5,.5) -> (1,2/3)
        let curve = PrecisionRecallCurve::from_flags(&[true, false, true], 2);
        let expected = 0.5 * 1.0 + 0.0 + 0.5 * (0.5 + 2.0 / 3.0) / 2.0;
        assert!((curve.average_precision() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_leading_false_positive() {
        let curve = PrecisionRecallCurve::from_flags(&[false, true], 1);
        // vertical drop to (0,0) then up to (1,.5)
        assert!((curve.average_precision() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_no_ground_truths() {
        let curve = PrecisionRecallCurve::from_flags(&[false, false], 0);
        assert_eq!(curve.average_precision(), 0.0);
    }
}
