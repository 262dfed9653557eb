use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, warn};

mod config;
mod error;
mod model;
mod stats;
mod web;

use config::Config;
use error::PredictError;
use model::ModelStore;
use web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;
    info!("Model path: {}", config.model_path);

    let store = ModelStore::new(&config.model_path);
    if config.preload_model {
        match store.get() {
            Ok(_) => {}
            Err(PredictError::ModelUnavailable { path }) => {
                warn!(
                    "No model at {}; predictions will report it missing until one is added",
                    path.display()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    let app = web::router(AppState { model: store });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Predictor listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
