//! framekv CLI Client
//!
//! Command-line interface for a running framekv server. Prints the
//! response payload to stdout and exits non-zero on any failure.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use framekv::{ClientCommand, Config, FramekvError, KvClient};

/// framekv CLI
#[derive(Parser, Debug)]
#[command(name = "framekv-cli")]
#[command(about = "CLI for the framekv key-value store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long)]
    address: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// User id override (defaults to the invoking Unix uid)
    #[arg(short, long)]
    user: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a value under a key
    ///
    /// With no value argument the value is read from stdin; a value of
    /// the form @path reads the file at path.
    Set {
        /// The key to set
        key: String,

        /// The value to store
        value: Option<String>,
    },

    /// Print the value stored under a key
    Get {
        /// The key to look up
        key: String,
    },

    /// Remove a key
    Delete {
        /// The key to remove
        key: String,
    },

    /// Report whether a key exists
    Exists {
        /// The key to check
        key: String,
    },
}

fn main() {
    // logs go to stderr so stdout stays clean for payloads
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::default();
    if let Some(path) = &args.config {
        if let Err(e) = config.overlay_file(path) {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
    if let Some(address) = args.address {
        config.client.address = address;
    }
    if let Some(port) = args.port {
        config.client.port = port;
    }

    let user = args.user.unwrap_or_else(current_uid);
    let command = match args.command {
        Commands::Set { key, value } => ClientCommand::Set { key, value },
        Commands::Get { key } => ClientCommand::Get { key },
        Commands::Delete { key } => ClientCommand::Delete { key },
        Commands::Exists { key } => ClientCommand::Exists { key },
    };

    let client = KvClient::new(&config.client, user);
    let mut stdout = io::stdout().lock();

    match client.execute(command, &mut stdout) {
        Ok(()) => {}
        Err(FramekvError::Remote(message)) => {
            let _ = stdout.flush();
            eprintln!("{message}");
            std::process::exit(1);
        }
        Err(e) => {
            let _ = stdout.flush();
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Uid of the invoking user
fn current_uid() -> u32 {
    // SAFETY: getuid has no failure mode and touches no memory
    unsafe { libc::getuid() }
}
