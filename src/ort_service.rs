use crate::{error::InferenceError, model_service::ModelService};
use ndarray::{Array, Ix4};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::{path::Path, sync::Mutex};

/// ONNX Runtime backed classifier. The session is built once at startup
/// and reused read-only for the process lifetime.
pub struct OrtModelService {
    session: Mutex<Session>,
}

impl OrtModelService {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        ort::init().commit()?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)?;

        tracing::info!("Loaded ONNX session from {:?}", model_path);

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl ModelService for OrtModelService {
    fn classify(&self, input: &Array<f32, Ix4>) -> Result<usize, InferenceError> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| InferenceError::Session(format!("session mutex poisoned: {}", e)))?;

        let tensor_ref = TensorRef::from_array_view(input.view())?;
        let outputs = session.run(ort::inputs![tensor_ref])?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        if data.is_empty() {
            return Err(InferenceError::OutputShape(format!(
                "empty output tensor with shape {:?}",
                shape
            )));
        }

        Ok(argmax(data))
    }
}

/// Index of the maximum logit; ties break to the lowest index.
fn argmax(logits: &[f32]) -> usize {
    let mut best = 0;
    for (index, value) in logits.iter().enumerate() {
        if *value > logits[best] {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_maximum_logit() {
        let logits = [0.1, -2.0, 4.5, 0.3, 4.4];
        assert_eq!(argmax(&logits), 2);
    }

    #[test]
    fn argmax_breaks_ties_to_lowest_index() {
        let logits = [1.0, 3.0, 3.0, 0.0];
        assert_eq!(argmax(&logits), 1);
    }

    #[test]
    fn argmax_of_single_logit_is_zero() {
        assert_eq!(argmax(&[0.7]), 0);
    }
}
