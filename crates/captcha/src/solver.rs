use crate::{backend::InferenceBackend, config::CaptchaConfig};
use common::span;
use detection::{DetectionError, Detector, LetterboxOptions, Pipeline, PipelineConfig};
use image::RgbImage;
use thiserror::Error;

/// Scales the detected gap offset to the drag distance the slider expects.
pub const DEFAULT_COMPENSATION_FACTOR: f32 = 1.03;

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("Captcha image is empty")]
    EmptyImage,

    #[error("Failed to decode captcha image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Gap detection failed: {0}")]
    Detection(#[from] DetectionError),
}

/// Finds the gap in a slider captcha and returns the horizontal drag distance.
pub struct SliderSolver<B: InferenceBackend> {
    detector: Detector<B>,
    compensation_factor: f32,
}

impl<B: InferenceBackend> SliderSolver<B> {
    pub fn new(detector: Detector<B>, compensation_factor: f32) -> Self {
        Self {
            detector,
            compensation_factor,
        }
    }

    pub fn from_config(backend: B, config: &CaptchaConfig) -> Self {
        let pipeline = Pipeline::new(PipelineConfig {
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            num_classes: None,
        });
        let detector = Detector::new(
            backend,
            LetterboxOptions::square(config.input_size),
            pipeline,
        );

        Self::new(detector, config.compensation_factor)
    }

    /// Decode an encoded (PNG, JPEG) captcha and solve it.
    pub fn solve(&mut self, image_bytes: &[u8]) -> Result<u32, SolveError> {
        if image_bytes.is_empty() {
            return Err(SolveError::EmptyImage);
        }

        let image = image::load_from_memory(image_bytes)?.to_rgb8();
        self.solve_image(&image)
    }

    /// Drag distance in original image pixels; 0 when no gap is detected.
    ///
    /// The gap is the most confident detection across all classes, the first
    /// one in output order on ties.
    pub fn solve_image(&mut self, image: &RgbImage) -> Result<u32, SolveError> {
        let _s = span!("solve_captcha");

        let detections = self.detector.detect(image)?;

        // Reversed so that max_by keeps the earliest box on ties
        let best = detections
            .set
            .iter()
            .rev()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence));
        let Some(gap) = best else {
            tracing::warn!("No gaps were detected");
            return Ok(0);
        };

        let x1 = detections.transform.to_original(gap).x1;
        tracing::info!(
            confidence = gap.confidence,
            x1,
            detections = detections.set.len(),
            "Detected gap"
        );

        Ok(self.distance(x1))
    }

    fn distance(&self, x1: f32) -> u32 {
        // f32::round rounds half away from zero; negative offsets clamp to 0
        (x1 * self.compensation_factor).round().max(0.0) as u32
    }
}
