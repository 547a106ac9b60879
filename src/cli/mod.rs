use clap::Parser;

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "parfum-api")]
#[command(about = "Parfum API - REST service for the perfume shop catalogue and clients")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Use in-memory document and session stores instead of Postgres")]
    pub memory: bool,
}

impl Cli {
    /// Fold command-line overrides into the environment configuration.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}
