use std::env;

use crate::solver::DEFAULT_COMPENSATION_FACTOR;
use detection::pipeline::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_IOU_THRESHOLD};

pub use common::Environment;

pub const DEFAULT_MODEL_PATH: &str = "assets/captcha.onnx";
pub const DEFAULT_INPUT_SIZE: u32 = 416;

#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    pub environment: Environment,
    pub model_path: String,
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub compensation_factor: f32,
}

impl CaptchaConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Self {
        let environment = Environment::from_env();

        let model_path = env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());

        let input_size = env::var("INPUT_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&size| size > 0)
            .unwrap_or(DEFAULT_INPUT_SIZE);

        let confidence_threshold = env::var("CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

        let iou_threshold = env::var("IOU_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_IOU_THRESHOLD);

        let compensation_factor = env::var("COMPENSATION_FACTOR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_COMPENSATION_FACTOR);

        Self {
            environment,
            model_path,
            input_size,
            confidence_threshold,
            iou_threshold,
            compensation_factor,
        }
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            model_path: DEFAULT_MODEL_PATH.to_string(),
            input_size: DEFAULT_INPUT_SIZE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            compensation_factor: DEFAULT_COMPENSATION_FACTOR,
        }
    }
}
