//! Class-index to label mapping

use serde_json::Value;
use signalclass_core::{Error, Result};
use std::collections::BTreeMap;

/// Fixed, ordered label vocabulary of a classification model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Vec<String>,
}

impl LabelVocabulary {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the vocabulary from a Hugging Face `config.json`.
    ///
    /// `id2label` keys are class indices encoded as strings. The class count
    /// is the largest of `num_labels`, `_num_labels` and the `id2label`
    /// extent; indices without a name become `LABEL_{i}`. A config with no
    /// label information describes a two-class model.
    pub fn from_model_config(config: &Value) -> Result<Self> {
        let mut named = BTreeMap::new();
        if let Some(id2label) = config.get("id2label").and_then(Value::as_object) {
            for (key, value) in id2label {
                let index: usize = key.trim().parse().map_err(|_| {
                    Error::model_load(format!("id2label key '{}' is not a class index", key))
                })?;
                let label = value.as_str().ok_or_else(|| {
                    Error::model_load(format!("id2label entry {} is not a string", key))
                })?;
                named.insert(index, label.to_string());
            }
        }

        let declared = ["num_labels", "_num_labels"]
            .iter()
            .filter_map(|field| config.get(*field).and_then(Value::as_u64))
            .map(|n| n as usize)
            .max()
            .unwrap_or(0);
        let extent = named.keys().next_back().map(|max| max + 1).unwrap_or(0);
        let num_labels = match declared.max(extent) {
            0 => 2,
            n => n,
        };

        let labels = (0..num_labels)
            .map(|idx| named.remove(&idx).unwrap_or_else(|| fallback_label(idx)))
            .collect();

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Label for a class index, using the `LABEL_{i}` convention past the end
    pub fn label_for(&self, index: usize) -> String {
        self.get(index)
            .map(str::to_string)
            .unwrap_or_else(|| fallback_label(index))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

fn fallback_label(index: usize) -> String {
    format!("LABEL_{}", index)
}
