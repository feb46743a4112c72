//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Message Format
//!
//! A full message is one start-of-transmission byte, zero or more frames,
//! and one end-of-transmission byte:
//!
//! ```text
//! ┌──────────┬─────────────────────────────┬──────────┐
//! │ SOT (1)  │          frame*             │ EOT (1)  │
//! └──────────┴─────────────────────────────┴──────────┘
//! ```
//!
//! ### Frame Format
//! ```text
//! ┌──────────┬─────────────┬─────────────────────────┐
//! │Opcode (1)│ Len (2, LE) │     Payload (Len)       │
//! └──────────┴─────────────┴─────────────────────────┘
//! ```
//!
//! ### Opcodes
//! - 0x01..0x04: operations  - SET, GET, DELETE, EXISTS (empty payload)
//! - 0x05..0x07: reserved    - EXPIRE-AT, EXPIRE-IN, LIST
//! - 0x10: USER              - 4-byte little-endian user id
//! - 0x11: KEY               - key bytes, chunked
//! - 0x12: VALUE             - value bytes, chunked
//! - 0x20: VALUE-RESPONSE    - success payload, chunked
//! - 0x21: ERROR-RESPONSE    - UTF-8 error message
//!
//! Payloads larger than [`MAX_ITEM_SIZE`] are split into multiple
//! consecutive frames of the same opcode; the receiver reassembles them by
//! concatenating in arrival order. The sentinel bytes (SOT 0xAA, EOT 0x55)
//! are disjoint from every opcode value.

mod block;
mod codec;
mod opcode;
mod queue;

pub use block::{decode_user_id, encode_user_id, Block, MAX_ITEM_SIZE};
pub use codec::{encode_message, read_frame, read_message, write_frame, write_message};
pub use opcode::{Opcode, EOT, SOT};
pub use queue::CommandQueue;
