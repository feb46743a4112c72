//! Opcode definitions
//!
//! The closed set of block tags understood by both endpoints, plus the
//! transmission sentinels delimiting one message on the wire.

use std::fmt;

/// Start-of-transmission sentinel, written as a bare byte (no length field)
pub const SOT: u8 = 0xAA;

/// End-of-transmission sentinel, written as a bare byte (no length field)
pub const EOT: u8 = 0x55;

/// Block tags on the wire
///
/// The numeric assignments are stable; reassigning them breaks wire
/// compatibility. Sentinel bytes must never collide with these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    // ----- operations (each begins a command)
    Set = 0x01,
    Get = 0x02,
    Delete = 0x03,
    Exists = 0x04,

    // ----- reserved operations (decoded, but rejected by the dispatcher)
    ExpireAt = 0x05,
    ExpireIn = 0x06,
    List = 0x07,

    // ----- markers
    User = 0x10,
    Key = 0x11,
    Value = 0x12,

    // ----- responses
    ValueResponse = 0x20,
    ErrorResponse = 0x21,
}

impl Opcode {
    /// Parse a wire byte into an opcode
    ///
    /// Returns `None` for bytes outside the closed set, including the
    /// SOT/EOT sentinels.
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        match byte {
            0x01 => Some(Opcode::Set),
            0x02 => Some(Opcode::Get),
            0x03 => Some(Opcode::Delete),
            0x04 => Some(Opcode::Exists),
            0x05 => Some(Opcode::ExpireAt),
            0x06 => Some(Opcode::ExpireIn),
            0x07 => Some(Opcode::List),
            0x10 => Some(Opcode::User),
            0x11 => Some(Opcode::Key),
            0x12 => Some(Opcode::Value),
            0x20 => Some(Opcode::ValueResponse),
            0x21 => Some(Opcode::ErrorResponse),
            _ => None,
        }
    }

    /// The wire representation of this opcode
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// True for the implemented operation opcodes
    pub fn is_operation(self) -> bool {
        matches!(
            self,
            Opcode::Set | Opcode::Get | Opcode::Delete | Opcode::Exists
        )
    }

    /// True for reserved operation opcodes
    pub fn is_reserved(self) -> bool {
        matches!(self, Opcode::ExpireAt | Opcode::ExpireIn | Opcode::List)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Set => "SET",
            Opcode::Get => "GET",
            Opcode::Delete => "DELETE",
            Opcode::Exists => "EXISTS",
            Opcode::ExpireAt => "EXPIRE-AT",
            Opcode::ExpireIn => "EXPIRE-IN",
            Opcode::List => "LIST",
            Opcode::User => "USER",
            Opcode::Key => "KEY",
            Opcode::Value => "VALUE",
            Opcode::ValueResponse => "VALUE-RESPONSE",
            Opcode::ErrorResponse => "ERROR-RESPONSE",
        };
        f.write_str(name)
    }
}
