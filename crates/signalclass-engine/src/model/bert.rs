use super::head::{PoolerTanhHead, ScoringHead};
use super::{load_with_prefixes, usize_field, EncodedBatch, SequenceClassifier};
use candle_core::Tensor;
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde_json::Value;
use signalclass_core::{Error, Result};

/// BERT encoder with the pooler/classifier head
pub struct BertForSequenceClassification {
    model: BertModel,
    head: PoolerTanhHead,
    num_labels: usize,
}

impl BertForSequenceClassification {
    pub fn load(vb: VarBuilder, config: &Value, num_labels: usize) -> Result<Self> {
        let bert_config: BertConfig = serde_json::from_value(config.clone())
            .map_err(|e| Error::model_load(format!("Failed to parse BERT config: {}", e)))?;
        let hidden_size = usize_field(config, &["hidden_size"])
            .ok_or_else(|| Error::model_load("BERT config does not declare hidden_size"))?;

        let (model, prefix) = load_with_prefixes(&vb, &["bert", ""], "BERT backbone", |vb| {
            BertModel::load(vb, &bert_config)
        })?;

        // The pooler lives next to the encoder it was trained with.
        let backbone_vb = if prefix.is_empty() { vb.clone() } else { vb.pp(prefix) };
        let head = PoolerTanhHead::load(
            backbone_vb.pp("pooler").pp("dense"),
            vb.pp("classifier"),
            hidden_size,
            num_labels,
        )
        .map_err(|e| Error::model_load(format!("Failed to load BERT classification head: {}", e)))?;

        Ok(Self {
            model,
            head,
            num_labels,
        })
    }
}

impl SequenceClassifier for BertForSequenceClassification {
    fn forward(&self, batch: &EncodedBatch) -> candle_core::Result<Tensor> {
        let hidden_states = self.model.forward(
            &batch.input_ids,
            &batch.token_type_ids,
            Some(&batch.attention_mask),
        )?;
        self.head.score(&hidden_states)
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn architecture(&self) -> &str {
        "bert"
    }
}
