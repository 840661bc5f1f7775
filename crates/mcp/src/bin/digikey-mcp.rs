// Standalone MCP server binary

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::Parser;
use digikey_client::DigiKeyClient;
use digikey_mcp::{digikey_registry, McpServer, ServerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "digikey-mcp")]
#[command(about = "MCP server for the DigiKey product information API", long_about = None)]
struct Args {
    /// OAuth2 client id
    #[arg(long, env = "CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Use the sandbox API instead of production
    #[arg(
        long,
        env = "USE_SANDBOX",
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    sandbox: Option<bool>,

    /// Path to configuration file
    #[arg(short, long, env = "DIGIKEY_MCP_CONFIG", default_value = "digikey-mcp.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries protocol frames, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    tracing::info!("DigiKey MCP server starting");

    let config = ServerConfig::load(&args.config)?;

    // Blank or missing values are rejected by the builder
    let builder = DigiKeyClient::builder().credentials(
        args.client_id.unwrap_or_default(),
        args.client_secret.unwrap_or_default(),
    );

    let client = config
        .apply(builder, args.sandbox)
        .connect()
        .await
        .context("Failed to start DigiKey client")?;

    let registry = digikey_registry(&client);
    tracing::info!(
        environment = client.config().environment.name(),
        tools = registry.len(),
        "Registered tools"
    );

    McpServer::new(registry).start().await?;

    Ok(())
}
