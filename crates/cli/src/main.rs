//! vpcalloc command-line client.

mod api_client;

use anyhow::{Context, Result};
use api_client::ApiClient;
use clap::{Parser, Subcommand};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vpcalloc_core::config::AppConfig;

#[derive(Parser)]
#[command(name = "vpcallocctl")]
#[command(about = "Command-line client for the vpcalloc VPC block allocator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check an allocation request without contacting any IPAM authority
    Validate {
        /// Request JSON file ("-" for stdin)
        file: PathBuf,
    },
    /// Allocate directly against the configured IPAM authority
    Allocate {
        /// Request JSON file ("-" for stdin)
        file: PathBuf,
        /// Path to configuration file
        #[arg(
            short,
            long,
            env = "VPCALLOC_CONFIG",
            default_value = "config/vpcalloc.toml"
        )]
        config: String,
    },
    /// Submit an allocation request to a running server
    Submit {
        /// Request JSON file ("-" for stdin)
        file: PathBuf,
        /// Server base URL
        #[arg(long, env = "VPCALLOCCTL_SERVER")]
        server: String,
    },
    /// Check that a server is up
    Health {
        /// Server base URL
        #[arg(long, env = "VPCALLOCCTL_SERVER")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so results can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Cli { command } = Cli::parse();

    match command {
        Commands::Validate { file } => {
            let properties = read_request(&file)?;
            let request = vpcalloc_core::validate(&properties)
                .with_context(|| format!("{} is not a valid request", file.display()))?;
            print_json(&request)
        }
        Commands::Allocate { file, config } => {
            let properties = read_request(&file)?;
            // Validate before touching the authority, as the server does.
            vpcalloc_core::validate(&properties)
                .with_context(|| format!("{} is not a valid request", file.display()))?;

            let config = load_config(&config)?;
            let ipam = vpcalloc_ipam::from_config(&config.ipam)
                .context("failed to initialize IPAM authority")?;
            let result = vpcalloc_ipam::allocate_properties(&properties, ipam.as_ref())
                .await
                .context("allocation failed")?;
            print_json(&result)
        }
        Commands::Submit { file, server } => {
            let properties = read_request(&file)?;
            let client = ApiClient::new(&server)?;
            let result = client.allocate(&properties).await?;
            print_json(&result)
        }
        Commands::Health { server } => {
            let client = ApiClient::new(&server)?;
            let health = client.health().await?;
            println!("{} (v{})", health.status, health.version);
            Ok(())
        }
    }
}

/// Read a request document from a file, or stdin for "-".
fn read_request(path: &Path) -> Result<Value> {
    let contents = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Load configuration from the optional file and `VPCALLOC_` variables.
///
/// Without either, the defaults apply: NetBox at localhost with the token
/// from `NETBOX_TOKEN`.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();
    if Path::new(path).exists() {
        tracing::debug!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("VPCALLOC_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
