//! mcpgate: an MCP gateway that multiplexes several child MCP servers behind
//! one MCP Streamable-HTTP endpoint and a REST facade.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use mcpgate_core::GatewayConfig;
use mcpgate_gateway::server::ServerConfig;
use mcpgate_gateway::GatewayServer;

/// Multiplexes several child MCP servers behind one MCP Streamable-HTTP
/// endpoint and a REST facade.
#[derive(Parser, Debug)]
#[command(name = "mcpgate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the mcpServers configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to bind the HTTP listener to.
    #[arg(long, default_value = "127.0.0.1:7890")]
    bind: String,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors).
    #[arg(short, long)]
    quiet: bool,

    /// Disable permissive CORS on the HTTP listener.
    #[arg(long)]
    no_cors: bool,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mcpgate").join("mcpgate.json"))
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(log_level(args.verbose, args.quiet));

    let config_path = args
        .config
        .or_else(default_config_path)
        .ok_or_else(|| anyhow::anyhow!("no --config given and no default config directory"))?;

    info!(path = %config_path.display(), "loading configuration");
    let config = match GatewayConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return Err(e.into());
        }
    };
    info!(children = config.children.len(), "configuration loaded");

    let (host, port) = args
        .bind
        .rsplit_once(':')
        .ok_or_else(|| anyhow::anyhow!("--bind must be HOST:PORT"))?;
    let server_config = ServerConfig {
        host: host.to_string(),
        port: port.parse()?,
        enable_cors: !args.no_cors,
        handshake_timeout: Duration::from_secs(30),
    };

    let server = GatewayServer::new(server_config, config);
    server.run(shutdown_signal()).await?;
    info!("mcpgate stopped");
    Ok(())
}

/// Resolves once SIGINT/SIGTERM is received, so `axum::serve` can drain
/// in-flight requests before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
