//! Score normalization and class selection

use candle_core::{Device, Tensor, D};
use signalclass_core::{Error, Result};

/// Normalize raw class scores into probabilities
pub fn softmax(logits: &[f32]) -> Result<Vec<f32>> {
    Tensor::new(logits, &Device::Cpu)
        .and_then(|t| candle_nn::ops::softmax(&t, D::Minus1))
        .and_then(|t| t.to_vec1())
        .map_err(|e| Error::inference(format!("Softmax failed: {}", e)))
}

/// Index and value of the largest probability; the first one wins ties
pub fn argmax(probs: &[f32]) -> Option<(usize, f32)> {
    probs
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (idx, p)| match best {
            Some((_, best_p)) if p <= best_p => best,
            _ => Some((idx, p)),
        })
}
