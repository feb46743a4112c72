//! Storage Module
//!
//! The key/value backend contract and the reference backends behind it.
//! The server consumes storage exclusively through the [`Backend`] trait;
//! swapping the persistence layer never touches the protocol or dispatch
//! code.
//!
//! ## Contract
//! - Keys are scoped per user id; no cross-user visibility.
//! - Empty keys and empty values are legal and round-trip unchanged.
//! - The backend handle is owned by the single serving thread for the
//!   server's entire lifetime.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::error::Result;

/// Abstract key/value backend, scoped per user id
pub trait Backend {
    /// Fetch the value stored under `key` for `user`
    ///
    /// Returns `None` when the key does not exist for that user.
    fn fetch(&self, key: &[u8], user: u32) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite the value stored under `key` for `user`
    fn upsert(&self, key: &[u8], value: &[u8], user: u32) -> Result<()>;

    /// Remove the entry under `key` for `user`
    ///
    /// Returns whether the entry existed.
    fn remove(&self, key: &[u8], user: u32) -> Result<bool>;

    /// True when an entry exists under `key` for `user`
    fn exists(&self, key: &[u8], user: u32) -> Result<bool>;
}
