//! Binary crate for the `wildfire` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Serving the HTTP API
//! - Interactive credential configuration

use clap::Parser;
use wildfire_core::Config;

mod cli;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real environment variables win.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wildfire_cli=info,wildfire_core=info,tower_http=info".into()),
        )
        .init();

    let cmd = cli::Cli::parse();
    let config = Config::load_with_env()?;
    cmd.run(config).await
}
