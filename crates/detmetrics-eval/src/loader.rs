//! JSON loading of detection, ground-truth and scored-box rows
//!
//! Files hold a JSON array of numeric rows, e.g. detections as
//! `[[image, class, score, c0, c1, c2, c3], ...]`.

use anyhow::Context;
use detmetrics_core::{Detection, GroundTruth, ScoredBox};
use std::path::Path;
use tracing::debug;

fn load_rows<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rows: {:?}", path))?;
    let rows: Vec<Vec<f64>> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse rows (expected an array of number arrays): {:?}", path))?;
    debug!(path = ?path, rows = rows.len(), "loaded rows");
    Ok(rows)
}

fn parse_rows<T>(
    rows: &[Vec<f64>],
    parse: impl Fn(&[f64]) -> detmetrics_core::Result<T>,
) -> anyhow::Result<Vec<T>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| parse(row.as_slice()).with_context(|| format!("Invalid row {}", i)))
        .collect()
}

/// Parse detection rows `[image, class, score, c0, c1, c2, c3]`
pub fn detections_from_rows(rows: &[Vec<f64>]) -> anyhow::Result<Vec<Detection>> {
    parse_rows(rows, Detection::from_row)
}

/// Parse ground-truth rows `[image, class, c0, c1, c2, c3]`
pub fn ground_truths_from_rows(rows: &[Vec<f64>]) -> anyhow::Result<Vec<GroundTruth>> {
    parse_rows(rows, GroundTruth::from_row)
}

/// Parse scored-box rows `[class, score, c0, c1, c2, c3]`
pub fn scored_boxes_from_rows(rows: &[Vec<f64>]) -> anyhow::Result<Vec<ScoredBox>> {
    parse_rows(rows, ScoredBox::from_row)
}

pub fn load_detections<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Detection>> {
    let path = path.as_ref();
    detections_from_rows(&load_rows(path)?).with_context(|| format!("In {:?}", path))
}

pub fn load_ground_truths<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<GroundTruth>> {
    let path = path.as_ref();
    ground_truths_from_rows(&load_rows(path)?).with_context(|| format!("In {:?}", path))
}

pub fn load_scored_boxes<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ScoredBox>> {
    let path = path.as_ref();
    scored_boxes_from_rows(&load_rows(path)?).with_context(|| format!("In {:?}", path))
}
