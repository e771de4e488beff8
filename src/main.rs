use clap::Parser;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use handler::RootDir;

/// Minimal HTTP file server for the current working directory
#[derive(Debug, Parser)]
#[command(name = "fileshare", version, about)]
struct Cli {
    /// Configuration file, without extension
    #[arg(short, long, default_value = "config", env = "FILESHARE_CONFIG")]
    config: String,

    /// Address to bind; overrides `server.host`
    #[arg(short, long, env = "FILESHARE_BIND")]
    bind: Option<String>,

    /// Port to listen on; overrides `server.port`
    #[arg(short, long, env = "FILESHARE_PORT")]
    port: Option<u16>,

    /// Debug logging for this crate
    #[arg(short, long, env = "FILESHARE_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cfg = config::Config::load_from(&cli.config)?;
    if let Some(host) = cli.bind {
        cfg.server.host = host;
    }
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    logger::init(&cfg.logging, cli.verbose)?;
    let root = RootDir::current_dir()?;

    // One thread: every connection is a local task on the same event loop
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg, root))
}

async fn async_main(cfg: config::Config, root: RootDir) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(cfg, root));
    logger::log_server_start(&addr, &state.dispatcher, &state.config);

    let shutdown = Arc::new(Notify::new());
    server::signal::start_signal_handler(Arc::clone(&shutdown))?;

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local.run_until(server::serve(listener, state, shutdown)).await;
    Ok(())
}
