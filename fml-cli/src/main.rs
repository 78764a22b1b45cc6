//! FML CLI
//!
//! Runs the Fast Mempool Locator server, or performs a single lookup against
//! a full node from the command line.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fml_api::{ApiConfig, ApiServer, LookupResponse};
use fml_core::constants::{DEFAULT_BIND, DEFAULT_PORT, DEFAULT_UPSTREAM_TIMEOUT_SECS, LOOKUP_PATH};
use fml_core::types::LookupRequest;
use fml_node::{FullNodeClient, LocatorConfig, MempoolLocator, NodeClientConfig};

/// FML - Fast Mempool Locator
#[derive(Parser)]
#[command(name = "fml")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "FML_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Bind address
        #[arg(short, long, env = "FML_BIND", default_value = DEFAULT_BIND)]
        bind: String,
    },

    /// Find the pending spend bundle spending a child of a parent coin
    Lookup {
        /// Parent coin info to search for
        parent_coin_info: String,
        /// Full-node mempool endpoint (e.g. https://localhost:8555/get_all_mempool_items)
        #[arg(short, long)]
        url: String,
        /// Upstream timeout in seconds
        #[arg(long, default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "fml=debug,info"
    } else {
        "fml=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, bind).await,
        Commands::Lookup {
            parent_coin_info,
            url,
            timeout,
        } => cmd_lookup(parent_coin_info, url, timeout).await,
    }
}

/// Run the API server
async fn cmd_serve(port: u16, bind: String) -> Result<()> {
    let config = ApiConfig {
        port,
        bind,
        ..ApiConfig::from_env()
    };
    let addr = config.socket_addr()?;

    println!("{}", "Starting Fast Mempool Locator...".cyan().bold());
    println!("   {} http://{}", "Listening on:".green(), addr);
    println!("   {} POST http://{}{}", "Lookup:".dimmed(), addr, LOOKUP_PATH);
    println!("   {} {}s", "Snapshot TTL:".dimmed(), config.snapshot_ttl_seconds);
    if config.allowed_hosts.is_empty() {
        println!("   {}", "Upstream allow-list: any host".yellow());
    } else {
        println!("   {} {}", "Upstream allow-list:".dimmed(), config.allowed_hosts.join(", "));
    }
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(config).context("Failed to initialize server")?;
    server.run(addr).await?;

    Ok(())
}

/// Perform one lookup against a full node
async fn cmd_lookup(parent_coin_info: String, url: String, timeout: u64) -> Result<()> {
    let client = FullNodeClient::with_config(NodeClientConfig {
        timeout_seconds: timeout,
        ..Default::default()
    })?;
    let locator = MempoolLocator::new(Arc::new(client), LocatorConfig::default());

    let request = LookupRequest {
        parent_coin_info,
        request_url: url,
    };
    let result = locator
        .locate(&request)
        .await
        .with_context(|| format!("Lookup against {} failed", request.request_url))?;

    if result.item.is_some() {
        info!(parent_coin_info = %request.parent_coin_info, "Found spend bundle");
        eprintln!("{}", "✓ Spend bundle found".green().bold());
    } else {
        eprintln!("{}", "✗ No matching spend bundle".yellow().bold());
    }

    let response = LookupResponse { item: result.item };
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
