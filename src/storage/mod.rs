// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Durable persistence for bridge transaction records.
//!
//! The [`TransactionStore`] is constructed once at start-up with an injected
//! [`StorageBackend`]. Backends only move opaque bytes under a key; the store
//! owns serialization, seeding and corruption recovery.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   solcipher-transactions.json   # FileBackend: one JSON array per key
//!   bridge.redb                   # RedbBackend: key -> bytes table
//! ```

pub mod file_backend;
pub mod paths;
pub mod redb_backend;
pub mod seed;
pub mod transaction_store;

use std::collections::HashMap;
use std::io;
use std::sync::RwLock;

pub use file_backend::FileBackend;
pub use paths::StoragePaths;
pub use redb_backend::RedbBackend;
pub use transaction_store::{TransactionFilter, TransactionStore, TRANSACTIONS_KEY};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    /// A blocking backend write panicked or was cancelled
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A lock guarding in-process state was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte-level persistence for a keyed document.
pub trait StorageBackend: Send + Sync {
    /// Read the document stored under `key`, or `None` if nothing was saved.
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the document stored under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
