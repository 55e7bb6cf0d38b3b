use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;

use erp_gateway::auth::InMemoryIdentityStore;
use erp_gateway::config::{default_config, load_config};
use erp_gateway::observability::{init_logging, init_metrics};
use erp_gateway::GatewayServer;

#[derive(Debug, Parser)]
#[command(name = "erp-gateway", about = "ERP API gateway with admission control")]
struct Args {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.config.as_deref().map(load_config).unwrap_or_else(default_config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(address) => {
                if let Err(e) = init_metrics(address) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                    return ExitCode::FAILURE;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Invalid metrics address");
                return ExitCode::FAILURE;
            }
        }
    }

    let identity = Arc::new(InMemoryIdentityStore::from_config(&config.identity));
    let bind_address = config.listener.bind_address.clone();

    let server = match GatewayServer::new(config, identity) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build gateway");
            return ExitCode::FAILURE;
        }
    };

    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, address = %bind_address, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    // Business routes are mounted here as the deployment grows; the
    // gateway itself serves auth and health.
    if let Err(e) = server.run(listener, Router::new()).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
