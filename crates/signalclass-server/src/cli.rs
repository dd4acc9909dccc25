use clap::Parser;
use signalclass_core::DeviceKind;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "signalclass-server")]
#[command(about = "signalclass text-classification service", long_about = None)]
pub struct Cli {
    /// Server configuration file path (defaults to config/server.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Model identifier (Hugging Face repo id or local directory)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Device to run inference on: cpu or gpu
    #[arg(short, long, value_parser = parse_device)]
    pub device: Option<DeviceKind>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_device(s: &str) -> Result<DeviceKind, String> {
    s.parse()
}
