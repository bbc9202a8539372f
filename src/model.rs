use log::{error, info};
use ndarray::Array4;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tract_core::prelude::Tensor;
use tract_onnx::prelude::*;

use crate::preprocess::{CHANNELS, INPUT_SIZE};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model sunucuda yüklü değil.")]
    Unavailable,
    #[error("Model loading error: {0}")]
    Load(String),
    #[error("Invalid input tensor: {0}")]
    Input(String),
    #[error("Inference error: {0}")]
    Inference(String),
}

/// Maps a normalized `(1, 224, 224, 3)` image tensor to class probabilities.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError>;
}

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// ONNX network executed with tract.
pub struct OnnxClassifier {
    plan: Plan,
}

impl OnnxClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let side = INPUT_SIZE as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(
                    0,
                    InferenceFact::dt_shape(f32::datum_type(), tvec!(1, side, side, CHANNELS)),
                )
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ModelError::Load(format!("{e:#}")))?;
        Ok(Self { plan })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError> {
        let data = input
            .as_slice()
            .ok_or_else(|| ModelError::Input("tensor is not contiguous".into()))?;
        let tensor = Tensor::from_shape(input.shape(), data)
            .map_err(|e| ModelError::Input(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| ModelError::Inference(format!("{e:#}")))?;
        let scores = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        Ok(scores.iter().copied().collect())
    }
}

/// Process-wide handle to the classifier, loaded once at startup.
///
/// A failed load does not stop the server: the host stays unavailable and every
/// prediction is refused until the process is restarted with a usable artifact.
#[derive(Clone)]
pub struct ModelHost {
    classifier: Option<Arc<dyn Classifier>>,
}

impl ModelHost {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        info!("Loading model from {}", path.display());
        match OnnxClassifier::load(path) {
            Ok(classifier) => {
                info!("Model loaded, server ready");
                Self::with_classifier(classifier)
            }
            Err(e) => {
                error!("Failed to load model {}: {}", path.display(), e);
                Self::unavailable()
            }
        }
    }

    pub fn with_classifier(classifier: impl Classifier + 'static) -> Self {
        Self {
            classifier: Some(Arc::new(classifier)),
        }
    }

    pub fn unavailable() -> Self {
        Self { classifier: None }
    }

    pub fn is_available(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError> {
        match &self.classifier {
            Some(classifier) => classifier.classify(input),
            None => Err(ModelError::Unavailable),
        }
    }
}
