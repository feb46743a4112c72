//! TCP server transport
//!
//! Accept loop with a bounded wait cycle. The listener polls for incoming
//! connections at a fixed interval so the shutdown token is observed
//! within one cycle even when no client ever connects. Connections are
//! served strictly one at a time: the handler runs to completion before
//! the next accept is attempted.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::{FramekvError, Result};

/// Wait interval per accept cycle; the shutdown token is re-checked at
/// least this often
pub const ACCEPT_WAIT: Duration = Duration::from_millis(200);

/// Shared stop flag polled by the accept loop
///
/// Cloned into whatever installs the stop request (signal handler, test
/// harness) and passed to the server at construction. Triggering an
/// already-triggered token is a no-op.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken(Arc<AtomicBool>);

impl ShutdownToken {
    /// Create an untriggered token
    pub fn new() -> ShutdownToken {
        ShutdownToken::default()
    }

    /// Request the accept loop to stop after its current cycle
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once a stop has been requested
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Listening socket plus the accept/serve loop
pub struct TcpServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown: ShutdownToken,
}

impl TcpServer {
    /// Bind the listening socket
    ///
    /// Bind failure is fatal at startup. The listener is switched to
    /// non-blocking so the loop can interleave accepts with token polls.
    pub fn bind(address: &str, port: u16, shutdown: ShutdownToken) -> Result<TcpServer> {
        let listener = TcpListener::bind((address, port)).map_err(|e| {
            FramekvError::Connection(format!("unable to bind {address}:{port}: {e}"))
        })?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        tracing::info!("listening on {local_addr}");
        Ok(TcpServer {
            listener,
            local_addr,
            shutdown,
        })
    }

    /// The bound address, useful when binding port 0
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the accept loop until the shutdown token triggers
    ///
    /// Each accepted connection is handed to `handler` synchronously; an
    /// in-flight connection is never interrupted by shutdown. A failed
    /// accept is logged and the loop continues.
    pub fn serve<F>(&self, mut handler: F)
    where
        F: FnMut(TcpStream, SocketAddr),
    {
        tracing::debug!("accept loop running");

        while !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    // accepted sockets go back to blocking mode
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("unable to configure socket for {peer}: {e}");
                        continue;
                    }
                    tracing::debug!("new connection from {peer}");
                    handler(stream, peer);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_WAIT);
                }
                Err(e) => {
                    tracing::warn!("accept failed: {e}");
                }
            }
        }

        tracing::info!("accept loop stopped");
    }
}
