//! Small in-memory components for tests and benchmarks
//!
//! Compiled only for this crate's tests or with the `test-utils` feature.
//! Nothing here touches the network or the file system: the tokenizer is a
//! whitespace word-level vocabulary and the classifiers score token ids
//! directly.

use crate::labels::LabelVocabulary;
use crate::model::{EncodedBatch, SequenceClassifier};
use candle_core::{DType, Tensor};
use signalclass_core::{Error, Result};
use std::collections::HashSet;

/// Serialized `tokenizer.json` behind [`toy_tokenizer`]
pub const TOY_TOKENIZER_JSON: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [],
  "normalizer": { "type": "Lowercase" },
  "pre_tokenizer": { "type": "Whitespace" },
  "post_processor": { "type": "BertProcessing", "sep": ["[SEP]", 2], "cls": ["[CLS]", 1] },
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": {
      "[UNK]": 0, "[CLS]": 1, "[SEP]": 2,
      "good": 3, "great": 4, "victory": 5, "win": 6,
      "bad": 7, "enemy": 8, "resistance": 9, "defeat": 10,
      "target": 11, "locked": 12, "expected": 13, "imminent": 14
    },
    "unk_token": "[UNK]"
  }
}"#;

/// Lowercasing whitespace tokenizer over a fixed fifteen-word vocabulary
pub fn toy_tokenizer() -> Result<tokenizers::Tokenizer> {
    tokenizers::Tokenizer::from_bytes(TOY_TOKENIZER_JSON.as_bytes())
        .map_err(|e| Error::tokenizer(format!("Failed to build toy tokenizer: {}", e)))
}

/// `NEGATIVE`, `POSITIVE`, in that order
pub fn binary_labels() -> LabelVocabulary {
    LabelVocabulary::new(["NEGATIVE", "POSITIVE"])
}

/// Binary classifier for [`toy_tokenizer`] that counts sentiment words
pub fn keyword_classifier() -> KeywordClassifier {
    KeywordClassifier {
        negative: [7, 8, 9, 10].into_iter().collect(),
        positive: [3, 4, 5, 6].into_iter().collect(),
    }
}

/// Scores each row as `[negative hits, positive hits]`
pub struct KeywordClassifier {
    negative: HashSet<u32>,
    positive: HashSet<u32>,
}

impl SequenceClassifier for KeywordClassifier {
    fn forward(&self, batch: &EncodedBatch) -> candle_core::Result<Tensor> {
        let rows: Vec<Vec<u32>> = batch.input_ids.to_vec2()?;
        let scores: Vec<f32> = rows
            .iter()
            .flat_map(|ids| {
                let hits = |set: &HashSet<u32>| ids.iter().filter(|id| set.contains(*id)).count();
                [hits(&self.negative) as f32, hits(&self.positive) as f32]
            })
            .collect();
        Tensor::from_vec(scores, (rows.len(), 2), batch.input_ids.device())
    }

    fn num_labels(&self) -> usize {
        2
    }

    fn architecture(&self) -> &str {
        "keyword"
    }
}

/// Always returns `batch_size` rows of zero logits regardless of input
pub struct FixedBatchClassifier {
    pub batch_size: usize,
}

impl SequenceClassifier for FixedBatchClassifier {
    fn forward(&self, batch: &EncodedBatch) -> candle_core::Result<Tensor> {
        Tensor::zeros((self.batch_size, 2), DType::F32, batch.input_ids.device())
    }

    fn num_labels(&self) -> usize {
        2
    }

    fn architecture(&self) -> &str {
        "fixed-batch"
    }
}
