use crate::error::InferenceError;
use ndarray::{Array, Ix4};

/// One forward pass over a preprocessed input tensor, returning the
/// predicted class index.
pub trait ModelService: Send + Sync + 'static {
    fn classify(&self, input: &Array<f32, Ix4>) -> Result<usize, InferenceError>;
}
