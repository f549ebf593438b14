//! Durable storage for the store state.
//!
//! The whole state lives in one record named `chat-storage`, shaped
//! `{"state": ..., "version": 0}`. There is no migration logic: an
//! unreadable record is reported and the caller starts fresh.

use crate::store::ChatState;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared::error::StorageResult;
use std::fs;
use std::path::{Path, PathBuf};

pub const STORAGE_KEY: &str = "chat-storage";
const RECORD_VERSION: u32 = 0;

pub trait StateStorage: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> StorageResult<Option<ChatState>>;

    fn save(&self, state: &ChatState) -> StorageResult<()>;
}

#[derive(Deserialize)]
struct PersistedRecord {
    state: ChatState,
    #[allow(dead_code)]
    #[serde(default)]
    version: u32,
}

#[derive(Serialize)]
struct PersistedRecordRef<'a> {
    state: &'a ChatState,
    version: u32,
}

fn encode(state: &ChatState) -> StorageResult<String> {
    Ok(serde_json::to_string_pretty(&PersistedRecordRef {
        state,
        version: RECORD_VERSION,
    })?)
}

fn decode(raw: &str) -> StorageResult<ChatState> {
    let record: PersistedRecord = serde_json::from_str(raw)?;
    Ok(record.state)
}

/// `chat-storage.json` inside a data directory
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{}.json", STORAGE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for JsonFileStorage {
    fn load(&self) -> StorageResult<Option<ChatState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        decode(&content).map(Some)
    }

    fn save(&self, state: &ChatState) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = encode(state)?;

        // Write to temp, then rename
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// Keeps the encoded record in memory. Used for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    record: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<String> {
        self.record.lock().clone()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Option<ChatState>> {
        match self.record.lock().as_deref() {
            Some(raw) => decode(raw).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, state: &ChatState) -> StorageResult<()> {
        *self.record.lock() = Some(encode(state)?);
        Ok(())
    }
}
