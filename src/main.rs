use ccip_gateway::server::{assemble, serve, GatewayConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// EIP-3668 offchain resolution gateway.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "CCIP_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listening port, overriding the configuration.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => GatewayConfig::from_file(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(port) = args.port {
        config.http_port = port;
    }
    tracing::debug!(?config, "configuration");

    let assembled = assemble(&config).await?;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    serve(assembled.gateway, listener, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    for task in assembled.tasks {
        task.abort();
    }
    Ok(())
}
