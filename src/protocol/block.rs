//! Block definitions
//!
//! A block is one opcode-tagged, length-prefixed unit of payload. Blocks
//! own their payload buffer; popping a block off a queue transfers that
//! ownership to the consumer.

use bytes::Bytes;

use crate::error::{FramekvError, Result};
use super::Opcode;

/// Maximum payload length per block
///
/// 64 KiB minus framing headroom. The 2-byte length field could represent
/// up to 65 535, but the encoder never emits more than this; longer
/// payloads are chunked into consecutive same-opcode blocks.
pub const MAX_ITEM_SIZE: usize = 65_532;

/// One opcode-tagged unit of payload in a command queue
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The block tag
    pub opcode: Opcode,

    /// Owned payload buffer, empty for marker-only blocks
    pub payload: Bytes,
}

impl Block {
    /// Create a block, validating that the payload length is representable
    pub fn new(opcode: Opcode, payload: impl Into<Bytes>) -> Result<Block> {
        let payload = payload.into();
        if payload.len() > u16::MAX as usize {
            return Err(FramekvError::Protocol(format!(
                "{} block payload of {} bytes exceeds the frame limit",
                opcode,
                payload.len()
            )));
        }
        Ok(Block { opcode, payload })
    }

    /// Create an empty marker block (operation opcodes carry no payload)
    pub fn marker(opcode: Opcode) -> Block {
        Block {
            opcode,
            payload: Bytes::new(),
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True when the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Encode a user id as a 4-byte little-endian USER payload
pub fn encode_user_id(user: u32) -> Bytes {
    Bytes::copy_from_slice(&user.to_le_bytes())
}

/// Decode a 4-byte little-endian USER payload
///
/// Any payload that is not exactly 4 bytes is a protocol violation; the
/// buffer length is validated before interpreting the bytes.
pub fn decode_user_id(payload: &[u8]) -> Result<u32> {
    let raw: [u8; 4] = payload.try_into().map_err(|_| {
        FramekvError::Protocol(format!(
            "USER id must be exactly 4 bytes, got {}",
            payload.len()
        ))
    })?;
    Ok(u32::from_le_bytes(raw))
}
