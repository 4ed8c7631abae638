pub mod backend;
pub mod decode;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod letterbox;
pub mod nms;
pub mod pipeline;
pub mod tensor;

// Re-export commonly used types for convenience
pub use backend::InferenceBackend;
pub use detector::{Detections, Detector};
pub use error::{DetectionError, Result};
pub use geometry::{CenterBox, CornerBox};
pub use letterbox::{LetterboxOptions, LetterboxTransform, Letterboxed, letterbox};
pub use pipeline::{DetectionSet, Pipeline, PipelineConfig, run};
