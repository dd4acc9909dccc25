//! Sequence-classification models built on candle-transformers backbones

pub mod bert;
pub mod distilbert;
pub mod head;

pub use bert::BertForSequenceClassification;
pub use distilbert::DistilBertForSequenceClassification;
pub use head::{DenseReluHead, PoolerTanhHead, ScoringHead};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use serde_json::Value;
use signalclass_core::{Error, Result};
use std::path::Path;
use tokenizers::Encoding;

/// A model mapping encoded token sequences to raw class scores
pub trait SequenceClassifier: Send + Sync {
    /// Run a forward pass, returning logits shaped `[batch, num_labels]`
    fn forward(&self, batch: &EncodedBatch) -> candle_core::Result<Tensor>;

    /// Number of classes the model scores
    fn num_labels(&self) -> usize;

    /// Architecture name, for logs
    fn architecture(&self) -> &str;
}

/// Model inputs, each shaped `[batch, seq]` with dtype u32
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub token_type_ids: Tensor,
}

impl EncodedBatch {
    /// Lift a single tokenizer encoding into a batch of one on `device`
    pub fn from_encoding(encoding: &Encoding, device: &Device) -> candle_core::Result<Self> {
        let row = |values: &[u32]| Tensor::new(values, device)?.unsqueeze(0);
        Ok(Self {
            input_ids: row(encoding.get_ids())?,
            attention_mask: row(encoding.get_attention_mask())?,
            token_type_ids: row(encoding.get_type_ids())?,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.input_ids.dims().first().copied().unwrap_or(0)
    }

    pub fn seq_len(&self) -> usize {
        self.input_ids.dims().get(1).copied().unwrap_or(0)
    }
}

/// Supported checkpoint families, keyed by `config.json` `model_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    DistilBert,
    Bert,
}

impl Architecture {
    pub fn from_model_config(config: &Value) -> Result<Self> {
        let model_type = config
            .get("model_type")
            .and_then(Value::as_str)
            .unwrap_or_default();

        match model_type.to_lowercase().as_str() {
            "distilbert" => Ok(Self::DistilBert),
            "bert" => Ok(Self::Bert),
            "" => Err(Error::model_load("config.json does not declare a model_type")),
            other => Err(Error::model_load(format!(
                "Unsupported architecture '{}' (supported: distilbert, bert)",
                other
            ))),
        }
    }
}

/// Build a classifier from a parsed `config.json` and safetensors weights
pub fn load_classifier(
    config: &Value,
    weights: &Path,
    num_labels: usize,
    device: &Device,
) -> Result<Box<dyn SequenceClassifier>> {
    let vb = load_var_builder(weights, device)?;

    let classifier: Box<dyn SequenceClassifier> = match Architecture::from_model_config(config)? {
        Architecture::DistilBert => Box::new(DistilBertForSequenceClassification::load(
            vb, config, num_labels,
        )?),
        Architecture::Bert => Box::new(BertForSequenceClassification::load(vb, config, num_labels)?),
    };

    tracing::info!(
        "Loaded {} classifier with {} labels",
        classifier.architecture(),
        classifier.num_labels()
    );

    Ok(classifier)
}

fn load_var_builder(weights: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    if !weights.exists() {
        return Err(Error::model_load(format!(
            "Weights not found: {}",
            weights.display()
        )));
    }

    // SAFETY: the file is memory-mapped read-only and must not be modified
    // while the model is alive.
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device)
            .map_err(|e| Error::model_load(format!("Failed to load weights: {}", e)))?
    };

    Ok(vb)
}

/// Try each weight prefix in turn; checkpoints disagree on whether the
/// backbone is nested under its model type.
fn load_with_prefixes<T>(
    vb: &VarBuilder,
    prefixes: &[&'static str],
    what: &str,
    load: impl Fn(VarBuilder) -> candle_core::Result<T>,
) -> Result<(T, &'static str)> {
    let mut errors = Vec::new();

    for prefix in prefixes {
        let vb_prefix = if prefix.is_empty() {
            vb.clone()
        } else {
            vb.pp(*prefix)
        };
        let effective_prefix = if prefix.is_empty() { "<root>" } else { prefix };

        match load(vb_prefix) {
            Ok(model) => {
                tracing::info!("Loaded {} from '{}'", what, effective_prefix);
                return Ok((model, prefix));
            }
            Err(e) => errors.push(format!("{}: {}", effective_prefix, e)),
        }
    }

    Err(Error::model_load(format!(
        "Failed to load {} with tried prefixes [{}]",
        what,
        errors.join(" | ")
    )))
}

fn usize_field(config: &Value, fields: &[&str]) -> Option<usize> {
    fields
        .iter()
        .find_map(|field| config.get(*field).and_then(Value::as_u64))
        .map(|v| v as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_architecture_detection() {
        assert_eq!(
            Architecture::from_model_config(&json!({"model_type": "distilbert"})).unwrap(),
            Architecture::DistilBert
        );
        assert_eq!(
            Architecture::from_model_config(&json!({"model_type": "BERT"})).unwrap(),
            Architecture::Bert
        );
    }

    #[test]
    fn test_unsupported_architecture_is_a_load_error() {
        let err = Architecture::from_model_config(&json!({"model_type": "gpt2"})).unwrap_err();
        assert!(matches!(err, Error::ModelLoad(_)));
        assert!(err.to_string().contains("gpt2"));

        assert!(Architecture::from_model_config(&json!({})).is_err());
    }

    #[test]
    fn test_missing_weights_is_a_load_error() {
        let err = load_classifier(
            &json!({"model_type": "bert"}),
            Path::new("/nonexistent/model.safetensors"),
            2,
            &Device::Cpu,
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("Weights not found"));
    }

    #[test]
    fn test_usize_field_takes_first_present() {
        let config = json!({"dim": 768, "hidden_size": 512});
        assert_eq!(usize_field(&config, &["dim", "hidden_size"]), Some(768));
        assert_eq!(usize_field(&config, &["hidden_size"]), Some(512));
        assert_eq!(usize_field(&config, &["missing"]), None);
    }
}
