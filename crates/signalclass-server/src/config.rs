//! Server configuration
//!
//! Layered lowest to highest: built-in defaults, a YAML/TOML/JSON file,
//! `SIGNALCLASS_*` environment variables, then command-line flags.

use crate::cli::Cli;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use signalclass_core::DeviceKind;
use signalclass_engine::{EngineOptions, DEFAULT_CONFIG_PATH};
use std::path::{Path, PathBuf};

/// Used when `--config` is not given; skipped silently if missing
pub const DEFAULT_SERVER_CONFIG: &str = "config/server.yaml";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Model identifier; falls back to the model config file, then the default
    #[serde(default)]
    pub model_name: Option<String>,

    /// Device override; auto-detected when unset
    #[serde(default)]
    pub device: Option<DeviceKind>,

    /// Path of the optional `model_name` config file
    #[serde(default = "default_model_config")]
    pub model_config: PathBuf,

    /// Inputs are truncated to this many tokens
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Largest accepted request body
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from file, environment and CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = Self::from_sources(cli.config.as_deref(), environment())?;

        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        if let Some(model) = &cli.model {
            config.model_name = Some(model.clone());
        }

        if let Some(device) = cli.device {
            config.device = Some(device);
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge an optional file with an environment source.
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn from_sources(path: Option<&Path>, env: Environment) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_SERVER_CONFIG).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize::<Self>()?;

        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_length == 0 {
            anyhow::bail!("max_length must be greater than 0");
        }

        if self.body_limit_bytes == 0 {
            anyhow::bail!("body_limit_bytes must be greater than 0");
        }

        Ok(())
    }

    /// Engine construction options derived from this configuration
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            model_name: self.model_name.clone(),
            device: self.device,
            config_path: self.model_config.clone(),
            max_length: self.max_length,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            model_name: None,
            device: None,
            model_config: default_model_config(),
            max_length: default_max_length(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// `SIGNALCLASS_PORT`, `SIGNALCLASS_MODEL_NAME`, ...
fn environment() -> Environment {
    Environment::with_prefix("SIGNALCLASS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_config() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

fn default_max_length() -> usize {
    512
}

fn default_body_limit() -> usize {
    64 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(source))
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_sources() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.yaml", "{}");

        let config = ServerConfig::from_sources(Some(&path), env(&[])).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.listen, "0.0.0.0");
        assert_eq!(config.model_name, None);
        assert_eq!(config.model_config, PathBuf::from("config/model_config.json"));
        assert_eq!(config.body_limit_bytes, 65536);
    }

    #[test]
    fn test_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "server.yaml",
            "port: 9100\nmodel_name: org/sentiment\ndevice: cpu\nmax_length: 128\n",
        );

        let config = ServerConfig::from_sources(Some(&path), env(&[])).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.model_name.as_deref(), Some("org/sentiment"));
        assert_eq!(config.device, Some(DeviceKind::Cpu));
        assert_eq!(config.max_length, 128);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "server.yaml", "port: 9100\n");

        let config = ServerConfig::from_sources(
            Some(&path),
            env(&[
                ("SIGNALCLASS_PORT", "9200"),
                ("SIGNALCLASS_MODEL_NAME", "env/model"),
            ]),
        )
        .unwrap();
        assert_eq!(config.port, 9200);
        assert_eq!(config.model_name.as_deref(), Some("env/model"));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(ServerConfig::from_sources(Some(&missing), env(&[])).is_err());
    }

    #[test]
    fn test_engine_options() {
        let config = ServerConfig {
            model_name: Some("org/model".to_string()),
            device: Some(DeviceKind::Gpu),
            max_length: 64,
            ..Default::default()
        };

        let options = config.engine_options();
        assert_eq!(options.model_name.as_deref(), Some("org/model"));
        assert_eq!(options.device, Some(DeviceKind::Gpu));
        assert_eq!(options.max_length, 64);
    }

    #[test]
    fn test_zero_max_length_is_rejected() {
        let config = ServerConfig {
            max_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
