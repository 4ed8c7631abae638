use thiserror::Error;

pub type Result<T> = std::result::Result<T, DetectionError>;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Invalid input shape {shape:?}: {reason}")]
    InvalidInputShape { shape: Vec<usize>, reason: String },

    #[error("Image buffer error: {0}")]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("Tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Inference backend failed: {0:#}")]
    Backend(anyhow::Error),
}

impl DetectionError {
    pub(crate) fn invalid_shape(shape: &[usize], reason: impl Into<String>) -> Self {
        DetectionError::InvalidInputShape {
            shape: shape.to_vec(),
            reason: reason.into(),
        }
    }
}
