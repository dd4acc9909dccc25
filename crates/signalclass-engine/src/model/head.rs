//! Classification heads
//!
//! A head turns encoder hidden states `[batch, seq, hidden]` into class
//! scores `[batch, num_labels]`. Both heads here read the first token of
//! each sequence ([CLS]).

use candle_core::{Result, Tensor};
use candle_nn::{Linear, Module, VarBuilder};

/// Maps encoder hidden states to per-class scores
pub trait ScoringHead: Send + Sync {
    fn score(&self, hidden_states: &Tensor) -> Result<Tensor>;
}

/// `dense -> ReLU -> classifier`, as used by DistilBERT
pub struct DenseReluHead {
    pre_classifier: Linear,
    classifier: Linear,
}

impl DenseReluHead {
    pub fn new(pre_classifier: Linear, classifier: Linear) -> Self {
        Self {
            pre_classifier,
            classifier,
        }
    }

    /// Load `pre_classifier` and `classifier` weights from the checkpoint root
    pub fn load(vb: VarBuilder, hidden_size: usize, num_labels: usize) -> Result<Self> {
        let pre_classifier = candle_nn::linear(hidden_size, hidden_size, vb.pp("pre_classifier"))?;
        let classifier = candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))?;
        Ok(Self::new(pre_classifier, classifier))
    }
}

impl ScoringHead for DenseReluHead {
    fn score(&self, hidden_states: &Tensor) -> Result<Tensor> {
        let cls = first_token(hidden_states)?;
        let pooled = self.pre_classifier.forward(&cls)?.relu()?;
        self.classifier.forward(&pooled)
    }
}

/// `pooler -> tanh -> classifier`, as used by BERT
pub struct PoolerTanhHead {
    pooler: Linear,
    classifier: Linear,
}

impl PoolerTanhHead {
    pub fn new(pooler: Linear, classifier: Linear) -> Self {
        Self { pooler, classifier }
    }

    /// `pooler_vb` points at the backbone's `pooler.dense`; `classifier_vb` at `classifier`
    pub fn load(
        pooler_vb: VarBuilder,
        classifier_vb: VarBuilder,
        hidden_size: usize,
        num_labels: usize,
    ) -> Result<Self> {
        let pooler = candle_nn::linear(hidden_size, hidden_size, pooler_vb)?;
        let classifier = candle_nn::linear(hidden_size, num_labels, classifier_vb)?;
        Ok(Self::new(pooler, classifier))
    }
}

impl ScoringHead for PoolerTanhHead {
    fn score(&self, hidden_states: &Tensor) -> Result<Tensor> {
        let cls = first_token(hidden_states)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        self.classifier.forward(&pooled)
    }
}

/// `[batch, seq, hidden]` -> `[batch, hidden]`
fn first_token(hidden_states: &Tensor) -> Result<Tensor> {
    hidden_states.narrow(1, 0, 1)?.squeeze(1)
}
