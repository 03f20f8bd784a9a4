//! Scored boxes, detections and ground-truth annotations
//!
//! Every record can also be read from a flat numeric row, the layout detectors and
//! annotation dumps usually emit:
//!
//! | record        | row                                         |
//! |---------------|---------------------------------------------|
//! | [`ScoredBox`] | `[class, score, c0, c1, c2, c3]`            |
//! | [`Detection`] | `[image, class, score, c0, c1, c2, c3]`     |
//! | [`GroundTruth`] | `[image, class, c0, c1, c2, c3]`          |

use super::bbox::BBox;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Anything non-max suppression can rank and compare
pub trait Candidate {
    fn class_id(&self) -> usize;
    fn score(&self) -> f64;
    fn bbox(&self) -> &BBox;
}

/// A class-labelled, scored box with no image association
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredBox {
    pub class_id: usize,
    pub score: f64,
    pub bbox: BBox,
}

/// A detector output for one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub image_id: u64,
    pub class_id: usize,
    pub score: f64,
    pub bbox: BBox,
}

/// An annotated object in one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub image_id: u64,
    pub class_id: usize,
    pub bbox: BBox,
}

impl ScoredBox {
    pub fn new(class_id: usize, score: f64, bbox: impl Into<BBox>) -> Self {
        Self {
            class_id,
            score,
            bbox: bbox.into(),
        }
    }

    pub fn from_row(row: &[f64]) -> Result<Self> {
        check_row(row, 6, "scored box")?;
        Ok(Self {
            class_id: class_from(row[0])?,
            score: row[1],
            bbox: BBox::from_slice(&row[2..])?,
        })
    }

    pub fn to_row(&self) -> Vec<f64> {
        let mut row = vec![self.class_id as f64, self.score];
        row.extend_from_slice(&self.bbox.0);
        row
    }
}

impl Detection {
    pub fn new(image_id: u64, class_id: usize, score: f64, bbox: impl Into<BBox>) -> Self {
        Self {
            image_id,
            class_id,
            score,
            bbox: bbox.into(),
        }
    }

    pub fn from_row(row: &[f64]) -> Result<Self> {
        check_row(row, 7, "detection")?;
        Ok(Self {
            image_id: id_from(row[0], "image id")?,
            class_id: class_from(row[1])?,
            score: row[2],
            bbox: BBox::from_slice(&row[3..])?,
        })
    }

    pub fn to_row(&self) -> Vec<f64> {
        let mut row = vec![self.image_id as f64, self.class_id as f64, self.score];
        row.extend_from_slice(&self.bbox.0);
        row
    }
}

impl GroundTruth {
    pub fn new(image_id: u64, class_id: usize, bbox: impl Into<BBox>) -> Self {
        Self {
            image_id,
            class_id,
            bbox: bbox.into(),
        }
    }

    pub fn from_row(row: &[f64]) -> Result<Self> {
        check_row(row, 6, "ground truth")?;
        Ok(Self {
            image_id: id_from(row[0], "image id")?,
            class_id: class_from(row[1])?,
            bbox: BBox::from_slice(&row[2..])?,
        })
    }

    pub fn to_row(&self) -> Vec<f64> {
        let mut row = vec![self.image_id as f64, self.class_id as f64];
        row.extend_from_slice(&self.bbox.0);
        row
    }
}

impl Candidate for ScoredBox {
    fn class_id(&self) -> usize {
        self.class_id
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn bbox(&self) -> &BBox {
        &self.bbox
    }
}

impl Candidate for Detection {
    fn class_id(&self) -> usize {
        self.class_id
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn bbox(&self) -> &BBox {
        &self.bbox
    }
}

fn check_row(row: &[f64], expected: usize, what: &str) -> Result<()> {
    if row.len() != expected {
        return Err(Error::invalid(format!(
            "a {what} row needs {expected} values, got {}",
            row.len()
        )));
    }
    if let Some(pos) = row.iter().position(|v| !v.is_finite()) {
        return Err(Error::invalid(format!(
            "{what} row has a non-finite value at position {pos}"
        )));
    }
    Ok(())
}

fn id_from(value: f64, what: &str) -> Result<u64> {
    if value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        return Err(Error::invalid(format!(
            "{what} must be a non-negative integer, got {value}"
        )));
    }
    Ok(value as u64)
}

fn class_from(value: f64) -> Result<usize> {
    let id = id_from(value, "class id")?;
    usize::try_from(id)
        .map_err(|_| Error::invalid(format!("class id {id} does not fit this platform")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_from_row() {
        let det = Detection::from_row(&[3.0, 1.0, 0.9, 0.0, 0.0, 10.0, 10.0]).unwrap();
        assert_eq!(det, Detection::new(3, 1, 0.9, [0.0, 0.0, 10.0, 10.0]));
        assert_eq!(det.to_row(), vec![3.0, 1.0, 0.9, 0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    fn test_ground_truth_from_row() {
        let gt = GroundTruth::from_row(&[0.0, 2.0, 1.0, 1.0, 4.0, 4.0]).unwrap();
        assert_eq!(gt.class_id, 2);
        assert_eq!(gt.bbox, BBox::new(1.0, 1.0, 4.0, 4.0));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let err = ScoredBox::from_row(&[1.0, 0.9, 0.0, 0.0, 10.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(Detection::from_row(&[0.0, 1.0, 0.9, 0.0, 0.0, 10.0]).is_err());
        assert!(GroundTruth::from_row(&[0.0, 1.0, 0.0, 0.0, 10.0, 10.0, 1.0]).is_err());
    }

    #[test]
    fn test_bad_ids_rejected() {
        assert!(ScoredBox::from_row(&[-1.0, 0.9, 0.0, 0.0, 1.0, 1.0]).is_err());
        assert!(ScoredBox::from_row(&[1.5, 0.9, 0.0, 0.0, 1.0, 1.0]).is_err());
        assert!(GroundTruth::from_row(&[f64::NAN, 0.0, 0.0, 0.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_ids_beyond_u64_rejected() {
        let too_big = u64::MAX as f64;
        assert!(matches!(
            GroundTruth::from_row(&[too_big, 0.0, 0.0, 0.0, 1.0, 1.0]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(Detection::from_row(&[0.0, too_big, 0.9, 0.0, 0.0, 1.0, 1.0]).is_err());
        assert!(ScoredBox::from_row(&[1e20, 0.9, 0.0, 0.0, 1.0, 1.0]).is_err());

        let largest = 9_007_199_254_740_992.0;
        let gt = GroundTruth::from_row(&[largest, 0.0, 0.0, 0.0, 1.0, 1.0]).unwrap();
        assert_eq!(gt.image_id, 9_007_199_254_740_992);
    }

    #[test]
    fn test_candidate_view() {
        let det = Detection::new(0, 4, 0.5, [0.0, 0.0, 2.0, 2.0]);
        assert_eq!(Candidate::class_id(&det), 4);
        assert_eq!(Candidate::score(&det), 0.5);
        assert_eq!(Candidate::bbox(&det), &BBox::new(0.0, 0.0, 2.0, 2.0));
    }
}
