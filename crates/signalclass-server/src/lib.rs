//! signalclass HTTP server
//!
//! Exposes a loaded [`signalclass_engine::InferenceEngine`] over HTTP:
//! `POST /predict`, `GET /health` and `GET /metrics`.

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::ServerConfig;
pub use routes::{create_router, AppError};
pub use state::AppState;
