//! TCP client transport
//!
//! A thin wrapper over a blocking [`TcpStream`]: resolve, connect, send
//! one serialized message, read one response. No connection reuse.

use std::io::{self, Write};
use std::net::TcpStream;

use crate::error::{FramekvError, Result};
use crate::protocol::{self, CommandQueue};

/// Blocking client connection to a framekv server
pub struct TcpClient {
    stream: TcpStream,
}

impl TcpClient {
    /// Resolve the address and connect
    ///
    /// Hostname resolution and the TCP connect both surface as
    /// connection errors; the caller treats them as fatal.
    pub fn connect(address: &str, port: u16) -> Result<TcpClient> {
        let stream = TcpStream::connect((address, port)).map_err(|e| {
            FramekvError::Connection(format!("unable to connect to {address}:{port}: {e}"))
        })?;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        tracing::debug!("connected to {address}:{port}");
        Ok(TcpClient { stream })
    }

    /// Send one fully serialized message
    ///
    /// The whole buffer goes through a single write call; any short write
    /// is reported as a partial-write error, there is no retry policy.
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let written = self.stream.write(bytes)?;
        if written != bytes.len() {
            return Err(FramekvError::PartialWrite {
                written,
                expected: bytes.len(),
            });
        }
        self.stream.flush()?;
        Ok(())
    }

    /// Read one full response message
    pub fn recv_message(&mut self) -> Result<CommandQueue> {
        protocol::read_message(&mut self.stream)
    }

    /// Discard whatever the peer still has in flight
    ///
    /// Used after a framing violation so the failure does not leave the
    /// process blocked on a half-read stream.
    pub fn purge(&mut self) {
        let _ = io::copy(&mut self.stream, &mut io::sink());
    }
}
