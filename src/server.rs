//! Server engine
//!
//! Owns the backend handle and the dispatcher, and runs the
//! per-connection state machine on a dedicated serving thread:
//!
//! 1. await SOT and read frames into a queue
//! 2. dispatch the queue against the backend
//! 3. serialize the response back over the same socket
//! 4. close the socket and resume the accept loop
//!
//! A protocol violation aborts that connection only; the server process
//! keeps accepting. Errors before a valid SOT cannot be reported to the
//! peer and are only logged.

use std::net::{SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::network::{ShutdownToken, TcpServer};
use crate::protocol;
use crate::store::Backend;

/// Running key-value server
///
/// Constructed via [`KvServer::start`], which binds the socket and spawns
/// the serving thread, so a server can never be started twice. Stopping
/// an already-stopped server is a no-op.
pub struct KvServer {
    shutdown: ShutdownToken,
    local_addr: SocketAddr,
    handle: Option<JoinHandle<()>>,
}

impl KvServer {
    /// Bind the configured address and start serving on a new thread
    ///
    /// The backend handle moves into the serving thread and is accessed
    /// only from there for the server's entire lifetime.
    pub fn start<B>(config: &Config, backend: B) -> Result<KvServer>
    where
        B: Backend + Send + 'static,
    {
        let shutdown = ShutdownToken::new();
        let listener = TcpServer::bind(
            &config.server.bind_address,
            config.server.bind_port,
            shutdown.clone(),
        )?;
        let local_addr = listener.local_addr();

        let handle = thread::spawn(move || {
            let dispatcher = Dispatcher::new(backend);
            listener.serve(|stream, peer| {
                if let Err(e) = serve_connection(stream, &dispatcher) {
                    tracing::warn!("connection from {peer} aborted: {e}");
                }
            });
        });

        Ok(KvServer {
            shutdown,
            local_addr,
            handle: Some(handle),
        })
    }

    /// The bound listening address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Token observed by the accept loop; trigger it to request a stop
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    /// Block until the serving thread exits
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("serving thread panicked");
            }
        }
    }

    /// Request a stop and wait for the serving thread
    ///
    /// The accept loop observes the token within one wait cycle; an
    /// in-flight connection finishes first.
    pub fn stop(&mut self) {
        self.shutdown.trigger();
        self.join();
    }
}

impl Drop for KvServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Serve one connection to completion
///
/// Reads exactly one command message, dispatches it, writes exactly one
/// response message. The socket closes when the stream drops.
fn serve_connection<B: Backend>(mut stream: TcpStream, dispatcher: &Dispatcher<B>) -> Result<()> {
    let request = protocol::read_message(&mut stream)?;
    let response = dispatcher.dispatch(request);
    protocol::write_message(&mut stream, &response)
}
