use ndarray::{Array, ArrayD, IxDyn};

/// The external inference engine: a `[1, 3, H, W]` input tensor in, the raw
/// `(1, N, 5+C)` prediction tensor out.
///
/// Implemented for any `FnMut(&Array<f32, IxDyn>) -> anyhow::Result<ArrayD<f32>>`,
/// so tests and embedders can inject a closure instead of a model session.
pub trait InferenceBackend {
    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<ArrayD<f32>>;
}

impl<F> InferenceBackend for F
where
    F: FnMut(&Array<f32, IxDyn>) -> anyhow::Result<ArrayD<f32>>,
{
    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<ArrayD<f32>> {
        self(input)
    }
}
