// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded key/value backend on redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `documents`: key → serialized document bytes

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{StorageBackend, StorageResult};

/// Primary table: storage key → document bytes.
const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// redb-backed storage.
pub struct RedbBackend {
    db: Database,
}

impl RedbBackend {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DOCUMENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl StorageBackend for RedbBackend {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS)?;
        Ok(table.get(key)?.map(|value| value.value().to_vec()))
    }

    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS)?;
            table.insert(key, bytes)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (RedbBackend, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let backend = RedbBackend::open(&dir.path().join("test.redb")).unwrap();
        (backend, dir)
    }

    #[test]
    fn load_missing_key() {
        let (backend, _dir) = open_temp();
        assert!(backend.load("nope").unwrap().is_none());
    }

    #[test]
    fn save_overwrites() {
        let (backend, _dir) = open_temp();
        backend.save("k", b"one").unwrap();
        backend.save("k", b"two").unwrap();
        assert_eq!(backend.load("k").unwrap().as_deref(), Some(&b"two"[..]));
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bridge.redb");
        {
            let backend = RedbBackend::open(&path).unwrap();
            backend.save("solcipher-transactions", b"[]").unwrap();
        }
        let reopened = RedbBackend::open(&path).unwrap();
        assert_eq!(
            reopened.load("solcipher-transactions").unwrap().as_deref(),
            Some(&b"[]"[..])
        );
    }
}
