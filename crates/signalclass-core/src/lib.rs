//! signalclass Core
//!
//! Types and error handling shared across signalclass components.
//!
//! This crate provides:
//! - The prediction request/response wire types
//! - The device selector used by engines and configuration
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{DeviceKind, PredictRequest, PredictionResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{DeviceKind, PredictRequest, PredictionResult};
}
