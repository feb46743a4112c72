//! Configuration for framekv
//!
//! One explicit configuration value built at process start and passed by
//! reference to the engines; there is no ambient global state.
//!
//! Precedence, lowest to highest: built-in defaults, TOML overlay file,
//! command-line flags (applied by the binaries after the overlay).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FramekvError, Result};

/// Main configuration for a framekv process
#[derive(Debug, Clone)]
pub struct Config {
    /// Snapshot database location
    pub database: PathBuf,

    /// Server-side settings
    pub server: ServerConfig,

    /// Client-side settings
    pub client: ClientConfig,
}

/// Listening endpoint for the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Binding interface address
    pub bind_address: String,

    /// Binding port
    pub bind_port: u16,
}

/// Target endpoint for the client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address to connect to
    pub address: String,

    /// Server port to connect to
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("./framekv.db"),
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                bind_port: 4567,
            },
            client: ClientConfig {
                address: "localhost".to_string(),
                port: 4567,
            },
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Overlay settings from a TOML file
    ///
    /// Only the keys present in the file are applied; everything else
    /// keeps its current value.
    pub fn overlay_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|e| {
            FramekvError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let overlay: ConfigOverlay = toml::from_str(&text).map_err(|e| {
            FramekvError::Config(format!("cannot parse config file {}: {e}", path.display()))
        })?;

        if let Some(database) = overlay.database {
            self.database = database;
        }
        if let Some(server) = overlay.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(bind_port) = server.bind_port {
                self.server.bind_port = bind_port;
            }
        }
        if let Some(client) = overlay.client {
            if let Some(address) = client.address {
                self.client.address = address;
            }
            if let Some(port) = client.port {
                self.client.port = port;
            }
        }

        tracing::debug!("applied config overlay from {}", path.display());
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the snapshot database location
    pub fn database(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database = path.into();
        self
    }

    /// Set the server binding address
    pub fn bind_address(mut self, address: impl Into<String>) -> Self {
        self.config.server.bind_address = address.into();
        self
    }

    /// Set the server binding port
    pub fn bind_port(mut self, port: u16) -> Self {
        self.config.server.bind_port = port;
        self
    }

    /// Set the client target address
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.client.address = address.into();
        self
    }

    /// Set the client target port
    pub fn port(mut self, port: u16) -> Self {
        self.config.client.port = port;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// partial mirror of Config for the TOML overlay

#[derive(Debug, Default, Deserialize)]
struct ConfigOverlay {
    database: Option<PathBuf>,
    server: Option<ServerOverlay>,
    client: Option<ClientOverlay>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerOverlay {
    bind_address: Option<String>,
    bind_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct ClientOverlay {
    address: Option<String>,
    port: Option<u16>,
}
