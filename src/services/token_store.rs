// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable credential storage and the default bearer header.
//!
//! Two string entries are persisted under fixed keys (`accessToken`,
//! `refreshToken`). Reads never fail; a missing or unreadable entry is
//! reported as absent. The bearer header used by the request pipeline is
//! kept here too, separate from the persisted entries.

use crate::error::{ClientError, Result};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tempfile::NamedTempFile;

/// Storage key of the access credential.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key of the refresh credential.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Durable string key-value storage.
pub trait CredentialStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage backends
// ─────────────────────────────────────────────────────────────────────────────

/// In-process storage (tests, and runs that should not touch disk).
#[derive(Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON file storage. The whole map is rewritten on every change.
pub struct FileStorage {
    path: PathBuf,
    entries: DashMap<String, String>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// An unreadable or corrupt file is treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let entries: DashMap<String, String> = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(map) => map.into_iter().collect(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt token file");
                    DashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DashMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read token file");
                DashMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ClientError::Storage(format!("{}: {}", parent.display(), e)))?;
                parent
            }
            None => Path::new("."),
        };
        let storage_err = |e: &dyn std::fmt::Display| {
            ClientError::Storage(format!("{}: {}", self.path.display(), e))
        };

        // Same directory as the target, so the rename stays on one filesystem
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| storage_err(&e))?;
        serde_json::to_writer_pretty(&mut tmp, &snapshot).map_err(|e| storage_err(&e))?;
        tmp.as_file().sync_all().map_err(|e| storage_err(&e))?;
        tmp.persist(&self.path).map_err(|e| storage_err(&e.error))?;
        Ok(())
    }
}

impl CredentialStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TokenStore
// ─────────────────────────────────────────────────────────────────────────────

/// Access/refresh credential pair plus the default bearer header.
pub struct TokenStore {
    storage: Box<dyn CredentialStorage>,
    /// Bearer credential attached to outgoing requests
    bearer: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn new(storage: impl CredentialStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            bearer: RwLock::new(None),
        }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Persist both credentials.
    pub fn save(&self, access: &str, refresh: &str) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, access)?;
        self.storage.set(REFRESH_TOKEN_KEY, refresh)
    }

    /// Replace only the access credential (after a renewal).
    pub fn save_access(&self, access: &str) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, access)
    }

    pub fn access(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn refresh(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Remove both credentials. Idempotent; storage failures are logged.
    pub fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove stored credential");
            }
        }
    }

    pub fn set_bearer(&self, access: &str) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = Some(access.to_string());
    }

    pub fn clear_bearer(&self) {
        *self.bearer.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Current default bearer credential, if any.
    pub fn bearer(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
