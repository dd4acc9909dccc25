//! signalclass Engine
//!
//! Candle-backed inference for pretrained sequence-classification models.
//!
//! Loading runs once per engine:
//! - the model identifier is resolved from the caller, an optional
//!   `config/model_config.json`, or the built-in default
//! - a device is chosen (GPU when available, else CPU)
//! - tokenizer, weights and label vocabulary are fetched from a local
//!   directory or the Hugging Face Hub
//!
//! After that, [`InferenceEngine::predict`] maps one text to a label, its
//! probability, and the raw class scores.

pub mod config;
pub mod device;
pub mod engine;
pub mod labels;
pub mod loader;
pub mod model;
pub mod scores;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{resolve_model_name, ConfigResolver, DEFAULT_CONFIG_PATH, DEFAULT_MODEL_ID};
pub use device::resolve_device;
pub use engine::{EngineOptions, InferenceEngine};
pub use labels::LabelVocabulary;
pub use loader::{ModelFiles, ModelSource, TokenizerFile};
pub use model::{Architecture, EncodedBatch, ScoringHead, SequenceClassifier};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::engine::{EngineOptions, InferenceEngine};
    pub use crate::labels::LabelVocabulary;
    pub use crate::model::{EncodedBatch, SequenceClassifier};
    pub use signalclass_core::{DeviceKind, Error, PredictionResult, Result};
}
