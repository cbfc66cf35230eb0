use acp_client::HttpSessionApi;
use acp_core::SessionOperations;
use acp_mcp_server::{serve, McpServer};
use acp_telemetry::{init_subscriber, TelemetryConfig};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "acp-mcp", version, about = "MCP server for Ambient Code Platform sessions")]
struct Args {
    /// Cluster config file. Falls back to $ACP_CLUSTER_CONFIG, then clusters.yaml lookup
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fallback log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let telemetry = TelemetryConfig::default()
        .with_level(args.log_level)
        .with_json_output(args.json_logs);
    init_subscriber(&telemetry).context("Failed to initialize logging")?;

    let resolved = acp_config::resolve_config(args.config.as_deref())?;
    info!(
        path = %resolved.path.display(),
        clusters = ?resolved.config.cluster_names(),
        default_cluster = ?resolved.config.default_cluster,
        "cluster config loaded"
    );

    let api = HttpSessionApi::new().context("Failed to build HTTP client")?;
    let server = McpServer::new(SessionOperations::new(api), resolved.config);

    serve(&server, BufReader::new(stdin()), stdout())
        .await
        .context("stdio transport failed")?;

    info!("stdin closed, shutting down");
    Ok(())
}
