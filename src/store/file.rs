//! File-backed snapshot backend
//!
//! Persists the whole entry table to a single snapshot file after every
//! mutation. Small stores only; the write path is rewrite-and-rename, so a
//! crash mid-write never corrupts the previous snapshot.
//!
//! ## File Format
//! ```text
//! ┌───────────┬──────────────────────────────┬─────────┐
//! │ Magic (8) │ bincode entry table          │ CRC (4) │
//! └───────────┴──────────────────────────────┴─────────┘
//! ```
//!
//! The CRC32 covers magic and table; a mismatch on load is a storage
//! error, not a silent reset.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{FramekvError, Result};
use super::Backend;

/// Snapshot file magic, bumped on format changes
const MAGIC: &[u8; 8] = b"FRAMEKV1";

/// One persisted entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    user: u32,
    key: Vec<u8>,
    value: Vec<u8>,

    /// Unix seconds of the last write
    timestamp: u64,
}

/// Persistent reference backend over a single snapshot file
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: RwLock<BTreeMap<(u32, Vec<u8>), StoredEntry>>,
}

impl FileBackend {
    /// Open an existing snapshot or start an empty store
    ///
    /// A missing file is a fresh store; the snapshot is created on the
    /// first mutation. A present but unreadable or corrupt snapshot fails
    /// the open.
    pub fn open(path: impl Into<PathBuf>) -> Result<FileBackend> {
        let path = path.into();

        let entries = if path.exists() {
            let table = load_snapshot(&path)?;
            tracing::info!(
                "loaded {} entries from snapshot {}",
                table.len(),
                path.display()
            );
            table
        } else {
            tracing::info!("creating new store at {}", path.display());
            BTreeMap::new()
        };

        Ok(FileBackend {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Snapshot file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries across all users
    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    /// Rewrite the snapshot from the current table
    fn persist(&self, table: &BTreeMap<(u32, Vec<u8>), StoredEntry>) -> Result<()> {
        let rows: Vec<&StoredEntry> = table.values().collect();
        let body = bincode::serialize(&rows)
            .map_err(|e| FramekvError::Storage(format!("snapshot encode failed: {e}")))?;

        let mut buf = Vec::with_capacity(MAGIC.len() + body.len() + 4);
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&body);
        let crc = crc32fast::hash(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());

        // write to a sibling temp file, then rename over the old snapshot
        let tmp = self.path.with_extension("tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(&buf)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!("persisted {} entries to {}", rows.len(), self.path.display());
        Ok(())
    }
}

impl Backend for FileBackend {
    fn fetch(&self, key: &[u8], user: u32) -> Result<Option<Vec<u8>>> {
        Ok(self
            .entries
            .read()
            .get(&(user, key.to_vec()))
            .map(|entry| entry.value.clone()))
    }

    fn upsert(&self, key: &[u8], value: &[u8], user: u32) -> Result<()> {
        let mut table = self.entries.write();
        table.insert(
            (user, key.to_vec()),
            StoredEntry {
                user,
                key: key.to_vec(),
                value: value.to_vec(),
                timestamp: unix_seconds(),
            },
        );
        self.persist(&table)
    }

    fn remove(&self, key: &[u8], user: u32) -> Result<bool> {
        let mut table = self.entries.write();
        let existed = table.remove(&(user, key.to_vec())).is_some();
        if existed {
            self.persist(&table)?;
        }
        Ok(existed)
    }

    fn exists(&self, key: &[u8], user: u32) -> Result<bool> {
        Ok(self.entries.read().contains_key(&(user, key.to_vec())))
    }
}

/// Read and validate a snapshot file
fn load_snapshot(path: &Path) -> Result<BTreeMap<(u32, Vec<u8>), StoredEntry>> {
    let raw = fs::read(path)?;

    if raw.len() < MAGIC.len() + 4 {
        return Err(FramekvError::Storage(format!(
            "snapshot {} is truncated",
            path.display()
        )));
    }
    let (body, crc_bytes) = raw.split_at(raw.len() - 4);

    if &body[..MAGIC.len()] != MAGIC {
        return Err(FramekvError::Storage(format!(
            "snapshot {} has an unrecognized header",
            path.display()
        )));
    }

    let stored_crc = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let actual_crc = crc32fast::hash(body);
    if stored_crc != actual_crc {
        return Err(FramekvError::Storage(format!(
            "snapshot {} failed checksum validation (stored 0x{stored_crc:08x}, computed 0x{actual_crc:08x})",
            path.display()
        )));
    }

    let rows: Vec<StoredEntry> = bincode::deserialize(&body[MAGIC.len()..])
        .map_err(|e| FramekvError::Storage(format!("snapshot decode failed: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|entry| ((entry.user, entry.key.clone()), entry))
        .collect())
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
