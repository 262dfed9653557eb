use clap::Parser;
use std::net::SocketAddr;

/// Basketball four factors game winner predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "four-factors-predictor", version, about)]
pub struct Config {
    /// Web form listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen_addr: String,

    /// Path to the trained classifier artifact (JSON)
    #[arg(
        long,
        env = "MODEL_PATH",
        default_value = "models/four_factors_logreg.json"
    )]
    pub model_path: String,

    /// Load the model at startup instead of on the first prediction
    #[arg(long, env = "PRELOAD_MODEL", default_value = "false")]
    pub preload_model: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!(
                "listen_addr must be a socket address such as 0.0.0.0:5000, got {:?}",
                self.listen_addr
            );
        }
        if self.model_path.trim().is_empty() {
            anyhow::bail!("model_path must not be empty");
        }
        Ok(())
    }
}
