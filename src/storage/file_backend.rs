// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filesystem backend: one JSON document per key under the data directory.
//!
//! Writes go to a temp file that is then renamed over the target, so a crash
//! mid-write leaves either the old or the new document, never a torn one.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use super::{StorageBackend, StoragePaths, StorageResult};

/// Plain-file backend.
#[derive(Debug, Clone)]
pub struct FileBackend {
    paths: StoragePaths,
}

impl FileBackend {
    /// Create the backend, ensuring the data directory exists.
    pub fn open(paths: StoragePaths) -> StorageResult<Self> {
        fs::create_dir_all(paths.root())?;
        Ok(Self { paths })
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(self.paths.document(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.paths.document(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(bytes)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn test_backend() -> FileBackend {
        let root = env::temp_dir().join(format!("test-file-backend-{}", uuid::Uuid::new_v4()));
        FileBackend::open(StoragePaths::new(root)).expect("open backend")
    }

    fn cleanup(backend: &FileBackend) {
        let _ = fs::remove_dir_all(backend.paths().root());
    }

    #[test]
    fn missing_key_loads_none() {
        let backend = test_backend();
        assert!(backend.load("absent").unwrap().is_none());
        cleanup(&backend);
    }

    #[test]
    fn save_then_load() {
        let backend = test_backend();
        backend.save("records", br#"[{"a":1}]"#).unwrap();
        assert_eq!(
            backend.load("records").unwrap().as_deref(),
            Some(&br#"[{"a":1}]"#[..])
        );

        // Overwrite leaves no temp file behind
        backend.save("records", b"[]").unwrap();
        assert_eq!(backend.load("records").unwrap().as_deref(), Some(&b"[]"[..]));
        assert!(!backend.paths().document("records").with_extension("tmp").exists());

        cleanup(&backend);
    }

    #[test]
    fn survives_reopen() {
        let backend = test_backend();
        backend.save("k", b"persisted").unwrap();

        let reopened = FileBackend::open(backend.paths().clone()).unwrap();
        assert_eq!(reopened.load("k").unwrap().as_deref(), Some(&b"persisted"[..]));

        cleanup(&backend);
    }
}
