//! Model identifier resolution
//!
//! The identifier an engine loads comes from, in order of precedence:
//! 1. an explicit caller argument
//! 2. the `model_name` field of an optional JSON file under `config/`
//! 3. [`DEFAULT_MODEL_ID`]
//!
//! Resolution is best-effort and never fails: a missing, unreadable or
//! malformed config file behaves exactly like an absent one.

use serde::Deserialize;
use signalclass_core::Result;
use std::path::{Path, PathBuf};

/// Identifier loaded when neither the caller nor the config file names one
pub const DEFAULT_MODEL_ID: &str = "distilbert-base-uncased-finetuned-sst-2-english";

/// Conventional location of the model config file, relative to the project root
pub const DEFAULT_CONFIG_PATH: &str = "config/model_config.json";

/// On-disk shape of the model config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfigFile {
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Resolves the model identifier an engine should load
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    path: PathBuf,
}

impl ConfigResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pick the identifier to load. Never fails.
    pub fn resolve(&self, explicit: Option<&str>) -> String {
        if let Some(name) = non_empty(explicit) {
            return name.to_string();
        }

        match self.read_model_name() {
            Ok(Some(name)) => {
                tracing::debug!(
                    "Using model '{}' from {}",
                    name,
                    self.path.display()
                );
                name
            }
            Ok(None) => DEFAULT_MODEL_ID.to_string(),
            Err(e) => {
                tracing::debug!(
                    "Ignoring model config {}: {}",
                    self.path.display(),
                    e
                );
                DEFAULT_MODEL_ID.to_string()
            }
        }
    }

    /// Read `model_name` from the config file.
    ///
    /// `Ok(None)` when the file does not exist or carries no usable name.
    pub fn read_model_name(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let file: ModelConfigFile = serde_json::from_str(&contents)?;

        Ok(non_empty(file.model_name.as_deref()).map(str::to_string))
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

/// Resolve with the conventional config path
pub fn resolve_model_name(explicit: Option<&str>) -> String {
    ConfigResolver::default().resolve(explicit)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
