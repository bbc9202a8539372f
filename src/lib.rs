//! HTTP service that identifies rock samples from photos.

pub mod config;
pub mod error;
pub mod handlers;
pub mod knowledge;
pub mod model;
pub mod models;
pub mod policy;
pub mod preprocess;

pub use crate::config::Config;
pub use crate::error::ApiError;
pub use crate::handlers::AppState;
pub use crate::knowledge::KnowledgeBase;
pub use crate::model::{Classifier, ModelError, ModelHost, OnnxClassifier};
pub use crate::policy::{decide, Prediction, CONFIDENCE_THRESHOLD, UNIDENTIFIED_LABEL};
