//! vpcalloc server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vpcalloc_core::config::AppConfig;
use vpcalloc_server::{AppState, create_router};

/// vpcalloc - VPC and subnet block allocator
#[derive(Parser, Debug)]
#[command(name = "vpcallocd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "VPCALLOC_CONFIG",
        default_value = "config/vpcalloc.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("vpcalloc v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let ipam = vpcalloc_ipam::from_config(&config.ipam)
        .context("failed to initialize IPAM authority")?;

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    let state = AppState::new(config, ipam).context("failed to build HTTP client")?;
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from the optional file and `VPCALLOC_` variables.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();
    let has_config_file = std::path::Path::new(path).exists();

    if has_config_file {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!("No config file found at {}", path);
    }

    // VPCALLOC_CONFIG only names the file.
    let has_env_config = std::env::vars()
        .any(|(key, _)| key.starts_with("VPCALLOC_") && key != "VPCALLOC_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: vpcallocd --config /path/to/config.toml\n  \
             2. Environment variables: VPCALLOC_IPAM__TYPE=netbox \
             VPCALLOC_IPAM__URL=https://netbox.example.com/ vpcallocd\n\n\
             See config/vpcalloc.example.toml for example configuration.\n\
             Set VPCALLOC_CONFIG env var to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    figment
        .merge(Env::prefixed("VPCALLOC_").split("__"))
        .extract()
        .context("failed to load configuration")
}
