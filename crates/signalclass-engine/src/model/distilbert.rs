use super::head::{DenseReluHead, ScoringHead};
use super::{load_with_prefixes, usize_field, EncodedBatch, SequenceClassifier};
use candle_core::Tensor;
use candle_nn::VarBuilder;
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use serde_json::Value;
use signalclass_core::{Error, Result};

/// DistilBERT encoder with the `pre_classifier`/`classifier` head
pub struct DistilBertForSequenceClassification {
    model: DistilBertModel,
    head: DenseReluHead,
    num_labels: usize,
}

impl DistilBertForSequenceClassification {
    pub fn load(vb: VarBuilder, config: &Value, num_labels: usize) -> Result<Self> {
        let distilbert_config: DistilBertConfig = serde_json::from_value(config.clone())
            .map_err(|e| Error::model_load(format!("Failed to parse DistilBERT config: {}", e)))?;
        let hidden_size = usize_field(config, &["dim", "hidden_size"]).ok_or_else(|| {
            Error::model_load("DistilBERT config declares neither dim nor hidden_size")
        })?;

        let (model, _) = load_with_prefixes(&vb, &["distilbert", ""], "DistilBERT backbone", |vb| {
            DistilBertModel::load(vb, &distilbert_config)
        })?;

        let head = DenseReluHead::load(vb, hidden_size, num_labels).map_err(|e| {
            Error::model_load(format!("Failed to load DistilBERT classification head: {}", e))
        })?;

        Ok(Self {
            model,
            head,
            num_labels,
        })
    }
}

impl SequenceClassifier for DistilBertForSequenceClassification {
    fn forward(&self, batch: &EncodedBatch) -> candle_core::Result<Tensor> {
        // candle's DistilBERT masks positions where the mask is non-zero,
        // the inverse of the tokenizer's attention mask.
        let padding_mask = batch.attention_mask.eq(0u32)?;
        let hidden_states = self.model.forward(&batch.input_ids, &padding_mask)?;
        self.head.score(&hidden_states)
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn architecture(&self) -> &str {
        "distilbert"
    }
}
