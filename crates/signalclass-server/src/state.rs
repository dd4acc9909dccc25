//! Shared application state

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use signalclass_engine::InferenceEngine;
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup; read-only afterwards
    pub engine: Arc<InferenceEngine>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,

    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        engine: InferenceEngine,
        config: ServerConfig,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            metrics_handle,
            config: Arc::new(config),
        }
    }

    /// Construct the engine described by `config` and wrap it in shared state.
    ///
    /// Model download and weight loading block, so they run off the runtime.
    pub async fn load(config: ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        let options = config.engine_options();
        info!("Loading inference engine");

        let engine = tokio::task::spawn_blocking(move || InferenceEngine::load(options)).await??;
        info!(
            "Engine ready: model={} device={} labels={}",
            engine.model_id(),
            engine.device_kind(),
            engine.labels().len()
        );

        Ok(Self::new(engine, config, metrics_handle))
    }
}
