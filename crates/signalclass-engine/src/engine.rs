//! Single-sequence inference engine
//!
//! An [`InferenceEngine`] owns exactly one tokenizer/model pair, loaded once
//! at construction and bound to one device. [`InferenceEngine::predict`]
//! classifies one text per call and returns the winning label, its
//! probability, and the raw per-class scores.

use crate::config::{ConfigResolver, DEFAULT_CONFIG_PATH};
use crate::device::{device_kind, resolve_device};
use crate::labels::LabelVocabulary;
use crate::loader::{load_tokenizer, ModelFiles, ModelSource};
use crate::model::{load_classifier, EncodedBatch, SequenceClassifier};
use crate::scores;
use candle_core::{DType, Device};
use signalclass_core::{DeviceKind, Error, PredictionResult, Result};
use std::path::PathBuf;
use std::time::Instant;
use tokenizers::Tokenizer;

/// Construction options for [`InferenceEngine::load`]
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Explicit model identifier; wins over the config file when non-empty
    pub model_name: Option<String>,

    /// Device override; auto-detected when `None`
    pub device: Option<DeviceKind>,

    /// Location of the optional model config file
    pub config_path: PathBuf,

    /// Inputs are truncated to this many tokens
    pub max_length: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            model_name: None,
            device: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            max_length: 512,
        }
    }
}

impl EngineOptions {
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_device(mut self, device: DeviceKind) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}

/// Tokenizer and classifier loaded for one model on one device
pub struct InferenceEngine {
    model_id: String,
    tokenizer: Tokenizer,
    model: Box<dyn SequenceClassifier>,
    labels: LabelVocabulary,
    device: Device,
}

impl InferenceEngine {
    /// Resolve, fetch and load a model. Any failure here is fatal.
    pub fn load(options: EngineOptions) -> Result<Self> {
        let start = Instant::now();

        let model_id =
            ConfigResolver::new(&options.config_path).resolve(options.model_name.as_deref());
        let device = resolve_device(options.device)?;
        tracing::info!("Loading model '{}' on {}", model_id, device_kind(&device));

        let files = ModelFiles::fetch(&ModelSource::from_identifier(&model_id))?;
        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&files.config).map_err(|e| {
                Error::model_load(format!("Failed to read {}: {}", files.config.display(), e))
            })?,
        )
        .map_err(|e| Error::model_load(format!("Failed to parse model config: {}", e)))?;

        let labels = LabelVocabulary::from_model_config(&config)?;
        let max_length = effective_max_length(&config, options.max_length);
        let tokenizer = load_tokenizer(&files.tokenizer, max_length)?;
        let model = load_classifier(&config, &files.weights, labels.len(), &device)?;

        tracing::info!(
            "Model '{}' ready in {:?} (labels: {:?})",
            model_id,
            start.elapsed(),
            labels.as_slice()
        );

        Self::from_parts(model_id, tokenizer, model, labels, device)
    }

    /// Assemble an engine from already-loaded components
    pub fn from_parts(
        model_id: impl Into<String>,
        tokenizer: Tokenizer,
        model: Box<dyn SequenceClassifier>,
        labels: LabelVocabulary,
        device: Device,
    ) -> Result<Self> {
        if labels.len() != model.num_labels() {
            return Err(Error::model_load(format!(
                "Label vocabulary has {} entries but the model scores {} classes",
                labels.len(),
                model.num_labels()
            )));
        }

        Ok(Self {
            model_id: model_id.into(),
            tokenizer,
            model,
            labels,
            device,
        })
    }

    /// Classify a single text
    pub fn predict(&self, text: &str) -> Result<PredictionResult> {
        let start = Instant::now();

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::tokenizer(format!("Tokenization failed: {}", e)))?;
        let batch = EncodedBatch::from_encoding(&encoding, &self.device)
            .map_err(|e| Error::inference(format!("Failed to build input tensors: {}", e)))?;

        // Weights are plain tensors rather than `Var`s, so no gradient
        // graph is recorded for the forward pass.
        let output = self
            .model
            .forward(&batch)
            .map_err(|e| Error::inference(format!("Model forward pass failed: {}", e)))?;

        let (batch_size, _) = output
            .dims2()
            .map_err(|e| Error::inference(format!("Unexpected logits shape: {}", e)))?;
        if batch_size != 1 {
            return Err(Error::InvalidInputShape { batch_size });
        }

        let logits: Vec<f32> = output
            .detach()
            .get(0)
            .and_then(|row| row.to_dtype(DType::F32))
            .and_then(|row| row.to_vec1())
            .map_err(|e| Error::inference(format!("Failed to read logits: {}", e)))?;
        let probs = scores::softmax(&logits)?;
        let (index, confidence) = scores::argmax(&probs)
            .ok_or_else(|| Error::inference("Model produced no class scores"))?;

        let result = PredictionResult {
            label: self.labels.label_for(index),
            confidence,
            logits,
        };

        tracing::debug!(
            "Predicted '{}' ({:.4}) for {} tokens in {}us",
            result.label,
            result.confidence,
            batch.seq_len(),
            start.elapsed().as_micros()
        );

        Ok(result)
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn labels(&self) -> &LabelVocabulary {
        &self.labels
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn device_kind(&self) -> DeviceKind {
        device_kind(&self.device)
    }
}

/// Truncation length bounded by the positions the model can embed
fn effective_max_length(config: &serde_json::Value, requested: usize) -> usize {
    match config
        .get("max_position_embeddings")
        .and_then(serde_json::Value::as_u64)
    {
        Some(positions) if (positions as usize) < requested => {
            tracing::debug!(
                "Capping max_length {} to the model's {} positions",
                requested,
                positions
            );
            positions as usize
        }
        _ => requested,
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("model_id", &self.model_id)
            .field("architecture", &self.model.architecture())
            .field("labels", &self.labels)
            .field("device", &self.device_kind())
            .finish()
    }
}
