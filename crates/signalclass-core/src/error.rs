//! Error types for signalclass

/// Result type alias using signalclass's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for signalclass operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Service configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Model or tokenizer could not be loaded; fatal to engine construction
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// The single-sequence contract was violated
    #[error("expected batch size of 1, got {batch_size}; provide a single sequence input")]
    InvalidInputShape { batch_size: usize },

    /// Tokenization failed while encoding an input
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Tensor or model execution failed during a forward pass
    #[error("inference error: {0}")]
    Inference(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new tokenizer error
    pub fn tokenizer(msg: impl Into<String>) -> Self {
        Self::Tokenizer(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Short, stable name of the error kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::ModelLoad(_) => "model_load",
            Self::InvalidInputShape { .. } => "invalid_input_shape",
            Self::Tokenizer(_) => "tokenizer",
            Self::Inference(_) => "inference",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }

    /// Whether the caller can recover by sending different input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInputShape { .. })
    }
}
