use clap::Parser;
use std::path::PathBuf;

/// Rock identification service: POST a base64 photo to /predict.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "GEOMIND_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(short, long, env = "GEOMIND_PORT", default_value_t = 5000)]
    pub port: u16,

    /// ONNX classifier artifact
    #[arg(short, long, env = "GEOMIND_MODEL", default_value = "geomind_local_model.onnx")]
    pub model: PathBuf,

    /// JSON rock table replacing the built-in one
    #[arg(long, env = "GEOMIND_KNOWLEDGE_BASE")]
    pub knowledge_base: Option<PathBuf>,

    /// Largest accepted request body, in MiB
    #[arg(long, env = "GEOMIND_MAX_PAYLOAD_MB", default_value_t = 16)]
    pub max_payload_mb: usize,

    /// HTTP worker threads (defaults to the number of CPUs)
    #[arg(long, env = "GEOMIND_WORKERS")]
    pub workers: Option<usize>,

    /// Report undecodable images and malformed bodies as 500 instead of 400
    #[arg(long, env = "GEOMIND_LEGACY_STATUS_CODES")]
    pub legacy_status_codes: bool,
}

impl Config {
    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_mb.saturating_mul(1024 * 1024)
    }
}
