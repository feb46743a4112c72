//! framekv Server Binary
//!
//! Starts the TCP server over the snapshot-backed store.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use framekv::store::FileBackend;
use framekv::{Config, KvServer};

/// framekv Server
#[derive(Parser, Debug)]
#[command(name = "framekv-server")]
#[command(about = "Key-value store server speaking the framekv binary protocol")]
#[command(version)]
struct Args {
    /// Binding interface address
    #[arg(long)]
    bind_address: Option<String>,

    /// Binding port
    #[arg(long)]
    bind_port: Option<u16>,

    /// Snapshot database path
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,framekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut config = Config::default();
    if let Some(path) = &args.config {
        if let Err(e) = config.overlay_file(path) {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
    if let Some(bind_address) = args.bind_address {
        config.server.bind_address = bind_address;
    }
    if let Some(bind_port) = args.bind_port {
        config.server.bind_port = bind_port;
    }
    if let Some(database) = args.database {
        config.database = database;
    }

    tracing::info!("framekv server v{}", framekv::VERSION);
    tracing::info!("database: {}", config.database.display());

    let backend = match FileBackend::open(&config.database) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!("failed to open store: {e}");
            std::process::exit(1);
        }
    };

    let mut server = match KvServer::start(&config, backend) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("failed to start server: {e}");
            std::process::exit(1);
        }
    };

    // Ctrl+C flips the shutdown token; the accept loop observes it within
    // one wait cycle
    let shutdown = server.shutdown_token();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("interrupt received, stopping...");
        shutdown.trigger();
    }) {
        tracing::error!("failed to install signal handler: {e}");
        std::process::exit(1);
    }

    tracing::info!("serving on {} (Ctrl+C to stop)", server.local_addr());
    server.join();

    tracing::info!("server stopped");
}
