use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub upload_dir: PathBuf,
    pub report_file: PathBuf,
    pub generation_endpoint: String,
    pub generation_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        // Load .env file if present (silently ignored if missing)
        let _ = dotenvy::dotenv();

        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let report_file = env::var("REPORT_FILE").unwrap_or_else(|_| "report.html".to_string());
        let generation_endpoint =
            env::var("GENERATION_ENDPOINT").unwrap_or_else(|_| "http://localhost:11434".to_string());
        let generation_model = env::var("GENERATION_MODEL").unwrap_or_else(|_| "qwen3:8b".to_string());

        Self {
            bind_address,
            upload_dir: PathBuf::from(upload_dir),
            report_file: PathBuf::from(report_file),
            generation_endpoint,
            generation_model,
        }
    }
}
