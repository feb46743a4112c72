//! # framekv
//!
//! A minimal user-scoped key-value store split into a TCP client and
//! server that exchange commands through a framed binary protocol.
//!
//! ## Architecture Overview
//!
//! ```text
//! CLI args                                             storage backend
//!    │                                                       ▲
//!    ▼                                                       │
//! ┌───────────────┐  queue  ┌─────────────┐  TCP   ┌─────────┴───────┐
//! │ Client Engine ├────────►│ Frame Codec ├───────►│ Server + Codec  │
//! └───────▲───────┘         └─────────────┘        └─────────┬───────┘
//!         │                                                  ▼
//!         │                 ┌─────────────┐         ┌─────────────────┐
//!         └─────────────────┤ Frame Codec │◄────────┤   Dispatcher    │
//!            render         └─────────────┘ respond └─────────────────┘
//! ```
//!
//! A command travels as one message: an SOT sentinel, a sequence of
//! opcode-tagged frames mirroring the in-memory command queue, and an EOT
//! sentinel. The server decodes the frames back into a queue, the
//! dispatcher walks it, calls the storage backend, and the response queue
//! takes the same path back.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod store;
pub mod dispatch;
pub mod client;
pub mod server;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FramekvError, Result};
pub use config::Config;
pub use client::{ClientCommand, KvClient};
pub use server::KvServer;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of framekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
