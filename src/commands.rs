//! Subcommand implementations, each returning the text to print

use anyhow::Context;
use detmetrics_core::{BBox, BoxFormat};
use detmetrics_eval::map::{coco_thresholds, evaluate};
use detmetrics_eval::{loader, EvalConfig, NmsConfig};
use std::path::Path;
use tracing::info;

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct MapOverrides {
    pub iou_threshold: Option<f64>,
    pub format: Option<BoxFormat>,
    pub num_classes: Option<usize>,
    pub coco: bool,
}

pub fn parse_box(text: &str) -> anyhow::Result<BBox> {
    let coords = text
        .split(',')
        .map(|c| {
            c.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid coordinate '{}'", c.trim()))
        })
        .collect::<anyhow::Result<Vec<f64>>>()?;
    Ok(BBox::from_slice(&coords)?)
}

pub fn iou(a: &str, b: &str, format: BoxFormat) -> anyhow::Result<String> {
    let a = parse_box(a).context("Failed to parse --a")?;
    let b = parse_box(b).context("Failed to parse --b")?;
    Ok(format!("{:.6}", detmetrics_eval::intersection_over_union(&a, &b, format)))
}

pub fn nms(
    input: &Path,
    iou_threshold: f64,
    score_threshold: f64,
    format: BoxFormat,
) -> anyhow::Result<String> {
    let boxes = loader::load_scored_boxes(input)?;
    let kept = NmsConfig::new(iou_threshold, score_threshold, format).apply(&boxes)?;
    info!(input = boxes.len(), kept = kept.len(), "non-max suppression");

    let rows: Vec<Vec<f64>> = kept.iter().map(|b| b.to_row()).collect();
    serde_json::to_string(&rows).context("Failed to serialize kept boxes")
}

pub fn map(
    detections: &Path,
    ground_truths: &Path,
    config: Option<&Path>,
    overrides: MapOverrides,
) -> anyhow::Result<String> {
    let config = resolve_config(config, overrides)?;
    let detections = loader::load_detections(detections)?;
    let ground_truths = loader::load_ground_truths(ground_truths)?;

    let report = evaluate(&detections, &ground_truths, &config)?;
    info!(
        map = report.mean_average_precision,
        classes = report.evaluated_classes,
        "evaluation complete"
    );

    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}

pub fn resolve_config(path: Option<&Path>, overrides: MapOverrides) -> anyhow::Result<EvalConfig> {
    let mut config = match path {
        Some(path) => EvalConfig::from_json_file(path)?,
        None => EvalConfig::default(),
    };

    if let Some(t) = overrides.iou_threshold {
        config.iou_threshold = t;
        config.iou_thresholds = None;
    }
    if let Some(format) = overrides.format {
        config.box_format = format;
    }
    if let Some(n) = overrides.num_classes {
        config.num_classes = n;
    }
    if overrides.coco {
        config.iou_thresholds = Some(coco_thresholds());
    }

    config.validate()?;
    Ok(config)
}
