#[cfg(feature = "ort-backend")]
pub mod ort;

pub use detection::InferenceBackend;
