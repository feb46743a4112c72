//! Frame codec
//!
//! Serializes blocks to a raw byte stream and reads them back. The codec
//! works against any [`Read`]/[`Write`] pair; both endpoints use it over a
//! blocking TCP stream.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬─────────────────────────────────────────┬──────────┐
//! │ SOT (1)  │ { opcode (1) + len (2, LE) + payload }* │ EOT (1)  │
//! └──────────┴─────────────────────────────────────────┴──────────┘
//! ```
//!
//! The sentinels are bare bytes without a length field. Short reads are
//! retried until the requested length is satisfied; a stream that closes
//! mid-message is a protocol error, never a valid end of message.

use std::io::{ErrorKind, Read, Write};

use bytes::Bytes;

use crate::error::{FramekvError, Result};
use super::{Block, CommandQueue, Opcode, EOT, SOT};

/// Write one frame: opcode byte, 2-byte little-endian length, payload
///
/// A zero length is still written for empty payloads.
pub fn write_frame<W: Write>(writer: &mut W, block: &Block) -> Result<()> {
    writer.write_all(&[block.opcode.as_byte()])?;
    writer.write_all(&(block.len() as u16).to_le_bytes())?;
    if !block.is_empty() {
        writer.write_all(&block.payload)?;
    }
    Ok(())
}

/// Read one frame, or `None` when the EOT sentinel is reached
///
/// The EOT byte carries no length or payload. Any other byte must be a
/// member of the opcode set, followed by its length and exactly that many
/// payload bytes.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Block>> {
    let mut tag = [0u8; 1];
    read_wire(reader, &mut tag)?;

    if tag[0] == EOT {
        return Ok(None);
    }

    let opcode = Opcode::from_byte(tag[0]).ok_or_else(|| {
        FramekvError::Protocol(format!("unknown opcode byte 0x{:02x}", tag[0]))
    })?;

    let mut len_buf = [0u8; 2];
    read_wire(reader, &mut len_buf)?;
    let length = u16::from_le_bytes(len_buf) as usize;

    let mut payload = vec![0u8; length];
    if length > 0 {
        read_wire(reader, &mut payload)?;
    }

    Ok(Some(Block {
        opcode,
        payload: Bytes::from(payload),
    }))
}

/// Read a full message into a freshly built queue
///
/// Fails with a protocol error when the first byte is not the SOT
/// sentinel; the caller must then discard the remainder of the stream or
/// close the connection, no mid-stream resynchronization is attempted.
pub fn read_message<R: Read>(reader: &mut R) -> Result<CommandQueue> {
    let mut sot = [0u8; 1];
    read_wire(reader, &mut sot)?;
    if sot[0] != SOT {
        return Err(FramekvError::Protocol(format!(
            "expected SOT sentinel 0x{:02x}, got 0x{:02x}",
            SOT, sot[0]
        )));
    }

    let mut queue = CommandQueue::new();
    while let Some(block) = read_frame(reader)? {
        tracing::trace!("read {} frame, {} bytes", block.opcode, block.len());
        queue.push(block);
    }
    Ok(queue)
}

/// Write a full message: SOT sentinel, every queued frame, EOT sentinel
pub fn write_message<W: Write>(writer: &mut W, queue: &CommandQueue) -> Result<()> {
    writer.write_all(&[SOT])?;
    for block in queue.iter() {
        write_frame(writer, block)?;
    }
    writer.write_all(&[EOT])?;
    writer.flush()?;
    Ok(())
}

/// Serialize a full message into one contiguous buffer
///
/// Used by the client, which must hand the whole message to a single
/// send call to detect partial writes.
pub fn encode_message(queue: &CommandQueue) -> Vec<u8> {
    let frames: usize = queue.iter().map(|b| 3 + b.len()).sum();
    let mut buf = Vec::with_capacity(2 + frames);

    buf.push(SOT);
    for block in queue.iter() {
        buf.push(block.opcode.as_byte());
        buf.extend_from_slice(&(block.len() as u16).to_le_bytes());
        buf.extend_from_slice(&block.payload);
    }
    buf.push(EOT);
    buf
}

/// `read_exact` with closed streams reported as protocol errors
fn read_wire<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            FramekvError::Protocol("stream closed mid-message".to_string())
        } else {
            FramekvError::Io(e)
        }
    })
}
