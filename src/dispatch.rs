//! Command dispatcher
//!
//! Interprets one decoded command queue as a storage operation and builds
//! the response queue. Pure state machine: the only I/O it performs is
//! the backend call itself.
//!
//! Expected block sequence per command:
//!
//! ```text
//! [operation] [USER id] [KEY...] ([VALUE...] for SET)
//! ```
//!
//! KEY and VALUE may arrive split over several consecutive same-opcode
//! blocks; they are reassembled here, lazily, by grouping consecutive
//! equal-opcode blocks off the front of the queue.

use bytes::Bytes;

use crate::error::{FramekvError, Result};
use crate::protocol::{decode_user_id, Block, CommandQueue, Opcode};
use crate::store::Backend;

/// Acknowledgement payload for mutating commands
const ACK: &[u8] = b"OK";

/// Maps decoded command queues to storage calls and response queues
pub struct Dispatcher<B: Backend> {
    backend: B,
}

impl<B: Backend> Dispatcher<B> {
    /// Create a dispatcher owning the backend handle
    pub fn new(backend: B) -> Dispatcher<B> {
        Dispatcher { backend }
    }

    /// Access the backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume one command queue and build the response queue
    ///
    /// Never fails: every error becomes an ERROR-RESPONSE. Whatever
    /// blocks remain unconsumed after the command is interpreted are
    /// dropped with the input queue.
    pub fn dispatch(&self, mut request: CommandQueue) -> CommandQueue {
        let response = match self.run(&mut request) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("command rejected: {e}");
                error_response(&e.to_string())
            }
        };

        if !request.is_empty() {
            tracing::trace!("discarding {} leftover blocks", request.len());
        }
        response
    }

    fn run(&self, request: &mut CommandQueue) -> Result<CommandQueue> {
        // 1. operation block
        let operation = request
            .pop()
            .ok_or_else(|| FramekvError::Protocol("empty command".to_string()))?;
        if operation.opcode.is_reserved() {
            return Err(FramekvError::Protocol(format!(
                "unsupported operation: {}",
                operation.opcode
            )));
        }
        if !operation.opcode.is_operation() {
            return Err(FramekvError::Protocol(format!(
                "command does not start with an operation, got {}",
                operation.opcode
            )));
        }

        // 2. USER marker, fixed 4-byte id
        let user_block = match request.pop() {
            Some(block) if block.opcode == Opcode::User => block,
            _ => {
                return Err(FramekvError::Protocol(
                    "missing USER marker after operation".to_string(),
                ))
            }
        };
        let user = decode_user_id(&user_block.payload)?;

        // 3. aggregate consecutive KEY blocks; zero blocks is an empty key
        let key = request.gather(Opcode::Key);

        tracing::debug!(
            "dispatching {} for user {user}, key of {} bytes",
            operation.opcode,
            key.len()
        );

        // 4. branch by command kind
        match operation.opcode {
            Opcode::Get => match self.backend.fetch(&key, user)? {
                Some(value) => Ok(value_response(value)),
                None => Err(FramekvError::KeyNotFound),
            },
            Opcode::Set => {
                let value = request.gather(Opcode::Value);
                self.backend.upsert(&key, &value, user)?;
                Ok(ack_response(ACK))
            }
            Opcode::Delete => {
                if self.backend.remove(&key, user)? {
                    Ok(ack_response(ACK))
                } else {
                    Err(FramekvError::KeyNotFound)
                }
            }
            Opcode::Exists => {
                let found = self.backend.exists(&key, user)?;
                Ok(ack_response(if found { b"True" } else { b"False" }))
            }
            _ => unreachable!("operation opcodes are filtered above"),
        }
    }
}

/// Build a success response carrying an arbitrarily long payload
///
/// The payload is chunked into VALUE-RESPONSE blocks; an empty payload
/// produces zero blocks.
pub fn value_response(payload: impl Into<Bytes>) -> CommandQueue {
    let mut response = CommandQueue::new();
    response.push_chunked(Opcode::ValueResponse, payload);
    response
}

/// Build a success response with a short fixed acknowledgement
fn ack_response(text: &'static [u8]) -> CommandQueue {
    let mut response = CommandQueue::new();
    response.push(Block {
        opcode: Opcode::ValueResponse,
        payload: Bytes::from_static(text),
    });
    response
}

/// Build an ERROR-RESPONSE queue from a UTF-8 message
pub fn error_response(message: &str) -> CommandQueue {
    let mut response = CommandQueue::new();
    response.push_chunked(
        Opcode::ErrorResponse,
        Bytes::copy_from_slice(message.as_bytes()),
    );
    response
}
