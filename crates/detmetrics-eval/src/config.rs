//! Evaluation configuration

use crate::nms::NmsConfig;
use anyhow::Context;
use detmetrics_core::{BoxFormat, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a class that has no ground-truth boxes at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroGroundTruthPolicy {
    /// Leave the class out of the mean
    #[default]
    Skip,
    /// Count the class with an AP of 0
    Zero,
}

/// Main evaluation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub iou_threshold: f64,
    pub box_format: BoxFormat,
    pub num_classes: usize,
    pub zero_ground_truth: ZeroGroundTruthPolicy,
    /// When set, mAP is averaged over these IoU thresholds instead of `iou_threshold`
    pub iou_thresholds: Option<Vec<f64>>,
    pub nms: NmsConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.5,
            box_format: BoxFormat::Corners,
            num_classes: 20,
            zero_ground_truth: ZeroGroundTruthPolicy::Skip,
            iou_thresholds: None,
            nms: NmsConfig::default(),
        }
    }
}

impl EvalConfig {
    /// PASCAL VOC style: 20 classes, single threshold at 0.5
    pub fn pascal_voc() -> Self {
        Self::default()
    }

    /// COCO style: 80 classes, averaged over 0.50:0.05:0.95
    pub fn coco() -> Self {
        Self {
            num_classes: 80,
            iou_thresholds: Some(crate::map::coco_thresholds()),
            ..Default::default()
        }
    }

    /// The IoU thresholds mAP is evaluated at
    pub fn thresholds(&self) -> Vec<f64> {
        match &self.iou_thresholds {
            Some(thresholds) => thresholds.clone(),
            None => vec![self.iou_threshold],
        }
    }

    pub fn validate(&self) -> detmetrics_core::Result<()> {
        for t in self.thresholds() {
            if !(0.0..=1.0).contains(&t) {
                return Err(Error::invalid(format!(
                    "iou threshold must lie in [0, 1], got {t}"
                )));
            }
        }
        if matches!(&self.iou_thresholds, Some(t) if t.is_empty()) {
            return Err(Error::invalid("iou_thresholds is empty"));
        }
        self.nms.validate()
    }

    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {:?}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.iou_threshold, 0.5);
        assert_eq!(config.num_classes, 20);
        assert_eq!(config.box_format, BoxFormat::Corners);
        assert_eq!(config.thresholds(), vec![0.5]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_coco_preset() {
        let config = EvalConfig::coco();
        assert_eq!(config.num_classes, 80);
        assert_eq!(config.thresholds().len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: EvalConfig =
            serde_json::from_str(r#"{"box_format": "midpoint", "zero_ground_truth": "zero"}"#)
                .unwrap();
        assert_eq!(config.box_format, BoxFormat::Midpoint);
        assert_eq!(config.zero_ground_truth, ZeroGroundTruthPolicy::Zero);
        assert_eq!(config.num_classes, 20);
    }

    #[test]
    fn test_unknown_format_rejected_by_serde() {
        let parsed = serde_json::from_str::<EvalConfig>(r#"{"box_format": "mindpoint"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_bad_threshold() {
        let config = EvalConfig {
            iou_threshold: 1.2,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let config = EvalConfig {
            iou_thresholds: Some(Vec::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("detmetrics-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"iou_threshold": 0.75, "num_classes": 3}"#)?;
        let config = EvalConfig::from_json_file(&path)?;
        std::fs::remove_file(&path)?;
        assert_eq!(config.iou_threshold, 0.75);
        assert_eq!(config.num_classes, 3);
        Ok(())
    }
}
