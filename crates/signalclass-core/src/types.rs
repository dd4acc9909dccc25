//! Core types for signalclass

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of classifying a single text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Label of the most probable class
    pub label: String,

    /// Softmax probability of that class (0.0-1.0)
    pub confidence: f32,

    /// Raw, unnormalized per-class scores in class-index order
    pub logits: Vec<f32>,
}

/// Body of a prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Single input sequence
    pub text: String,
}

impl PredictRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Hardware an engine runs inference on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// CPU inference (always available)
    Cpu,
    /// GPU inference (CUDA, or Metal on Apple Silicon)
    Gpu,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "gpu" | "cuda" | "cuda:0" | "metal" | "mps" => Ok(Self::Gpu),
            other => Err(format!("unknown device '{other}', expected cpu or gpu")),
        }
    }
}
