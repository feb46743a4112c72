//! In-memory backend
//!
//! BTreeMap keyed by (user, key) behind an RwLock. The serving thread is
//! the only accessor today; the lock keeps the handle safe to share if a
//! concurrent connection model is ever added.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::Result;
use super::Backend;

/// Volatile reference backend, primarily for tests and ephemeral servers
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<(u32, Vec<u8>), Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> MemoryBackend {
        MemoryBackend::default()
    }

    /// Number of stored entries across all users
    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }
}

impl Backend for MemoryBackend {
    fn fetch(&self, key: &[u8], user: u32) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(&(user, key.to_vec())).cloned())
    }

    fn upsert(&self, key: &[u8], value: &[u8], user: u32) -> Result<()> {
        self.entries
            .write()
            .insert((user, key.to_vec()), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &[u8], user: u32) -> Result<bool> {
        Ok(self
            .entries
            .write()
            .remove(&(user, key.to_vec()))
            .is_some())
    }

    fn exists(&self, key: &[u8], user: u32) -> Result<bool> {
        Ok(self.entries.read().contains_key(&(user, key.to_vec())))
    }
}
