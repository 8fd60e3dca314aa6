mod ai;
mod analysis;
mod chat;
mod config;
mod report;
mod server;

use std::sync::Arc;

use tracing::info;

use crate::ai::TextGenerator;
use crate::config::Config;
use crate::server::AppState;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    std::fs::create_dir_all(&config.upload_dir)?;
    report::ensure_placeholder(&config.report_file)?;

    let generator = TextGenerator::new(&config.generation_endpoint, &config.generation_model);
    let state = AppState {
        config: Arc::new(config.clone()),
        generator,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "listening");
    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
