//! Intersection over Union
//!
//! Overlap ratio between two boxes given in the same [`BoxFormat`], for single pairs and
//! element-wise over batches.

use detmetrics_core::{BBox, BoxFormat, Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Smoothing term added to every denominator so degenerate inputs never divide by zero
pub const EPSILON: f64 = 1e-6;

/// Compute the IoU of two boxes read as `format`.
///
/// Never fails: reversed or zero-sized boxes have their intersection clamped to zero,
/// so the result degrades toward 0 rather than going negative. Because of the
/// [`EPSILON`] term a box compared with itself scores just under 1.
pub fn intersection_over_union(a: &BBox, b: &BBox, format: BoxFormat) -> f64 {
    let [ax1, ay1, ax2, ay2] = a.to_corners(format);
    let [bx1, by1, bx2, by2] = b.to_corners(format);

    let ix1 = ax1.max(bx1);
    let iy1 = ay1.max(by1);
    // right/bottom edges of the intersection are the nearer ones
    let ix2 = ax2.min(bx2);
    let iy2 = ay2.min(by2);

    let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let area_a = a.area(format);
    let area_b = b.area(format);

    intersection / (area_a + area_b - intersection + EPSILON)
}

/// IoU with the format given by name (`"corners"` or `"midpoint"`)
pub fn iou_str(a: &BBox, b: &BBox, format: &str) -> Result<f64> {
    let format: BoxFormat = format.parse()?;
    Ok(intersection_over_union(a, b, format))
}

/// Element-wise IoU over two equally long batches of boxes
pub fn iou_batch(a: &[BBox], b: &[BBox], format: BoxFormat) -> Result<Vec<f64>> {
    if a.len() != b.len() {
        return Err(Error::invalid(format!(
            "batch length mismatch: {} boxes vs {} boxes",
            a.len(),
            b.len()
        )));
    }

    #[cfg(feature = "parallel")]
    let ious = a
        .par_iter()
        .zip(b.par_iter())
        .map(|(a, b)| intersection_over_union(a, b, format))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let ious = a
        .iter()
        .zip(b)
        .map(|(a, b)| intersection_over_union(a, b, format))
        .collect();

    Ok(ious)
}

/// All-pairs IoU: `result[i][j]` is the IoU of `a[i]` and `b[j]`
pub fn iou_matrix(a: &[BBox], b: &[BBox], format: BoxFormat) -> Vec<Vec<f64>> {
    a.iter()
        .map(|a| {
            b.iter()
                .map(|b| intersection_over_union(a, b, format))
                .collect()
        })
        .collect()
}
