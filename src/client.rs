//! Client engine
//!
//! Maps a parsed command plus the local user id to a command queue, then
//! drives one synchronous round trip: encode, transmit, receive, render.
//! The process performs exactly one request/response exchange per
//! invocation; there is no connection reuse.

use std::fs;
use std::io::{self, IsTerminal, Read, Write};

use bytes::Bytes;

use crate::config::ClientConfig;
use crate::error::{FramekvError, Result};
use crate::network::TcpClient;
use crate::protocol::{self, Block, CommandQueue, Opcode, MAX_ITEM_SIZE};

/// Values starting with this sigil name a file to read the value from
const FILE_SIGIL: char = '@';

/// A parsed client command
#[derive(Debug, Clone)]
pub enum ClientCommand {
    /// Store a value under a key; a missing value falls back to stdin
    Set { key: String, value: Option<String> },

    /// Fetch the value under a key
    Get { key: String },

    /// Remove the entry under a key
    Delete { key: String },

    /// Report whether a key exists
    Exists { key: String },
}

/// One-shot client for a framekv server
pub struct KvClient {
    config: ClientConfig,
    user: u32,
}

impl KvClient {
    /// Create a client targeting the configured address with the given
    /// user id
    pub fn new(config: &ClientConfig, user: u32) -> KvClient {
        KvClient {
            config: config.clone(),
            user,
        }
    }

    /// Execute one command against the server, rendering the response
    ///
    /// VALUE-RESPONSE payloads are streamed to `out` verbatim in arrival
    /// order, followed by one trailing newline. An ERROR-RESPONSE from
    /// the server surfaces as [`FramekvError::Remote`] after the message
    /// is fully drained, so no partial output is left behind.
    pub fn execute(&self, command: ClientCommand, out: &mut impl Write) -> Result<()> {
        let request = self.build_request(&command)?;

        let mut conn = TcpClient::connect(&self.config.address, self.config.port)?;
        conn.send(&protocol::encode_message(&request))?;

        let response = match conn.recv_message() {
            Ok(queue) => queue,
            Err(e @ FramekvError::Protocol(_)) => {
                // framing is broken, discard whatever else is in flight
                conn.purge();
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        render(response, out)
    }

    /// Build the request queue for a command
    ///
    /// Block order is fixed: operation marker, USER id, chunked KEY, and
    /// for SET the chunked VALUE.
    pub fn build_request(&self, command: &ClientCommand) -> Result<CommandQueue> {
        let mut queue = CommandQueue::new();

        let (opcode, key) = match command {
            ClientCommand::Set { key, .. } => (Opcode::Set, key),
            ClientCommand::Get { key } => (Opcode::Get, key),
            ClientCommand::Delete { key } => (Opcode::Delete, key),
            ClientCommand::Exists { key } => (Opcode::Exists, key),
        };

        queue.push_marker(opcode);
        queue.push_user(self.user);
        queue.push_chunked(Opcode::Key, Bytes::copy_from_slice(key.as_bytes()));

        if let ClientCommand::Set { value, .. } = command {
            push_value_blocks(&mut queue, value.as_deref())?;
        }

        Ok(queue)
    }
}

/// Append VALUE blocks according to the sourcing precedence
///
/// Literal argument first; an argument starting with the file sigil reads
/// the named file instead; with no argument at all, stdin is read in
/// bounded chunks, one block per chunk. Empty input attached to a
/// terminal emits no block at all.
fn push_value_blocks(queue: &mut CommandQueue, value: Option<&str>) -> Result<()> {
    match value {
        Some(literal) => {
            if let Some(path) = literal.strip_prefix(FILE_SIGIL) {
                let data = fs::read(path).map_err(|e| {
                    FramekvError::Config(format!("cannot read value file {path}: {e}"))
                })?;
                queue.push_chunked(Opcode::Value, Bytes::from(data));
            } else {
                queue.push_chunked(Opcode::Value, Bytes::copy_from_slice(literal.as_bytes()));
            }
        }
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Ok(());
            }

            let mut input = stdin.lock();
            let mut buf = vec![0u8; MAX_ITEM_SIZE];
            loop {
                let n = input.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                queue.push(Block {
                    opcode: Opcode::Value,
                    payload: Bytes::copy_from_slice(&buf[..n]),
                });
            }
        }
    }
    Ok(())
}

/// Drain a response queue, streaming payloads to `out`
fn render(mut response: CommandQueue, out: &mut impl Write) -> Result<()> {
    let mut remote_error: Option<String> = None;

    while let Some(block) = response.pop() {
        match block.opcode {
            Opcode::ValueResponse => out.write_all(&block.payload)?,
            Opcode::ErrorResponse => {
                remote_error = Some(String::from_utf8_lossy(&block.payload).into_owned());
            }
            other => {
                return Err(FramekvError::Protocol(format!(
                    "unexpected {other} block in response"
                )))
            }
        }
    }

    match remote_error {
        Some(message) => Err(FramekvError::Remote(message)),
        None => {
            out.write_all(b"\n")?;
            out.flush()?;
            Ok(())
        }
    }
}
