use crate::{decode::decode, error::Result, geometry::CornerBox, nms::suppress};
use common::span_debug;
use ndarray::ArrayViewD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    /// Expected number of classes; `None` accepts any trailing dimension above 5.
    pub num_classes: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            num_classes: None,
        }
    }
}

/// Final detections, ordered by ascending `class_id` and then by keep order
/// within each class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionSet {
    boxes: Vec<CornerBox>,
}

impl DetectionSet {
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn first(&self) -> Option<&CornerBox> {
        self.boxes.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CornerBox> {
        self.boxes.iter()
    }

    pub fn as_slice(&self) -> &[CornerBox] {
        &self.boxes
    }

    pub fn into_vec(self) -> Vec<CornerBox> {
        self.boxes
    }
}

impl FromIterator<CornerBox> for DetectionSet {
    fn from_iter<I: IntoIterator<Item = CornerBox>>(iter: I) -> Self {
        Self {
            boxes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DetectionSet {
    type Item = CornerBox;
    type IntoIter = std::vec::IntoIter<CornerBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a CornerBox;
    type IntoIter = std::slice::Iter<'a, CornerBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.iter()
    }
}

/// Stateless post-processing: decode, per-class NMS, concatenate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Turn a raw `(1, N, 5+C)` or `(N, 5+C)` prediction into final detections.
    ///
    /// No candidate above the confidence threshold yields an empty set.
    pub fn run(&self, raw: ArrayViewD<'_, f32>) -> Result<DetectionSet> {
        let _s = span_debug!("postprocess");

        let candidates = decode(
            raw,
            self.config.confidence_threshold,
            self.config.num_classes,
        )?;

        // BTreeMap keeps classes in ascending id order
        let mut by_class: BTreeMap<usize, Vec<CornerBox>> = BTreeMap::new();
        for candidate in &candidates {
            by_class
                .entry(candidate.class_id)
                .or_default()
                .push(candidate.to_corner_form());
        }

        let detections: DetectionSet = by_class
            .values()
            .flat_map(|class_boxes| suppress(class_boxes, self.config.iou_threshold))
            .collect();

        tracing::trace!(
            candidates = candidates.len(),
            classes = by_class.len(),
            detections = detections.len(),
            "Post-processing complete"
        );

        Ok(detections)
    }
}

/// Run the pipeline with the given thresholds and no declared class count.
pub fn run(
    raw: ArrayViewD<'_, f32>,
    confidence_threshold: f32,
    iou_threshold: f32,
) -> Result<DetectionSet> {
    Pipeline::new(PipelineConfig {
        confidence_threshold,
        iou_threshold,
        num_classes: None,
    })
    .run(raw)
}
