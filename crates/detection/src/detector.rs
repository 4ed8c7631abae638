use crate::{
    backend::InferenceBackend,
    error::{DetectionError, Result},
    geometry::CornerBox,
    letterbox::{LetterboxOptions, LetterboxTransform, Letterboxed, letterbox},
    pipeline::{DetectionSet, Pipeline},
    tensor::to_input_tensor,
};
use common::span_debug;
use image::RgbImage;

/// Detections in model input space together with the letterbox transform that
/// produced that space.
#[derive(Debug, Clone)]
pub struct Detections {
    pub set: DetectionSet,
    pub transform: LetterboxTransform,
}

impl Detections {
    /// Detections mapped back to original image coordinates, in output order.
    pub fn to_original(&self) -> impl Iterator<Item = CornerBox> + '_ {
        self.set.iter().map(|b| self.transform.to_original(b))
    }
}

/// Image in, detections out: letterbox, tensor conversion, inference, post-processing.
pub struct Detector<B: InferenceBackend> {
    backend: B,
    letterbox: LetterboxOptions,
    pipeline: Pipeline,
}

impl<B: InferenceBackend> Detector<B> {
    pub fn new(backend: B, letterbox: LetterboxOptions, pipeline: Pipeline) -> Self {
        Self {
            backend,
            letterbox,
            pipeline,
        }
    }

    pub fn letterbox_options(&self) -> &LetterboxOptions {
        &self.letterbox
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn detect(&mut self, image: &RgbImage) -> Result<Detections> {
        let _s = span_debug!("detect");

        let Letterboxed {
            image: input_image,
            transform,
        } = letterbox(image, &self.letterbox)?;

        let input = to_input_tensor(&input_image)?;

        let raw = self
            .backend
            .infer(&input)
            .map_err(DetectionError::Backend)?;

        let set = self.pipeline.run(raw.view())?;

        Ok(Detections { set, transform })
    }
}
