// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable keyed collection of bridge transaction records.
//!
//! The whole collection is persisted as one JSON array under
//! [`TRANSACTIONS_KEY`]. An in-process copy serves reads; every `put` is
//! written through to the backend before it becomes visible.
//!
//! Writers are serialized by an async gate and the backend write runs on the
//! blocking pool with no lock held, so readers never wait on disk I/O.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use utoipa::IntoParams;
use uuid::Uuid;

use super::seed::seed_records;
use super::{StorageBackend, StorageResult};
use crate::blockchain::ChainKey;
use crate::bridge::record::{BridgeStatus, TransactionRecord};

/// Fixed storage key for the transaction collection.
pub const TRANSACTIONS_KEY: &str = "solcipher-transactions";

/// Optional criteria for history queries.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionFilter {
    /// Only records currently in this status
    pub status: Option<BridgeStatus>,
    /// Only records whose source or destination is this chain
    pub chain: Option<ChainKey>,
}

impl TransactionFilter {
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        let status_ok = self.status.is_none_or(|status| record.status == status);
        let chain_ok = self
            .chain
            .is_none_or(|chain| record.source_chain == chain || record.dest_chain == chain);
        status_ok && chain_ok
    }
}

/// Transaction store with write-through persistence.
pub struct TransactionStore {
    backend: Arc<dyn StorageBackend>,
    records: RwLock<Vec<TransactionRecord>>,
    writer: Mutex<()>,
}

impl TransactionStore {
    /// Load the collection from `backend`, seeding it when nothing usable is
    /// persisted.
    ///
    /// Corrupt documents are logged and replaced by the seed set; only a
    /// backend that cannot be read or written at all is an error.
    pub fn open(backend: Arc<dyn StorageBackend>) -> StorageResult<Self> {
        let (records, dirty) = match backend.load(TRANSACTIONS_KEY)? {
            None => {
                tracing::info!(backend = backend.name(), "No persisted transactions, seeding");
                (seed_records(Utc::now()), true)
            }
            Some(bytes) => decode_collection(&bytes),
        };

        let store = Self {
            backend,
            records: RwLock::new(records),
            writer: Mutex::new(()),
        };
        if dirty {
            let records = store.read();
            store.persist(&records)?;
        }

        tracing::info!(
            backend = store.backend.name(),
            count = store.read().len(),
            "Transaction store loaded"
        );
        Ok(store)
    }

    /// Insert or replace a record by id.
    ///
    /// Returns only after the backend accepted the write. Until then readers
    /// keep seeing the previous collection.
    pub async fn put(&self, record: TransactionRecord) -> StorageResult<()> {
        let _gate = self.writer.lock().await;

        let mut next = self.read().clone();
        match next.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record,
            None => next.push(record),
        }
        let bytes = serde_json::to_vec_pretty(&next)?;

        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || backend.save(TRANSACTIONS_KEY, &bytes)).await??;

        *self.write() = next;
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<TransactionRecord> {
        self.read().iter().find(|record| record.id == id).cloned()
    }

    /// All records, newest first by `created_at`.
    pub fn list(&self) -> Vec<TransactionRecord> {
        self.list_filtered(&TransactionFilter::default())
    }

    /// Records matching `filter`, newest first by `created_at`.
    pub fn list_filtered(&self, filter: &TransactionFilter) -> Vec<TransactionRecord> {
        let mut matching: Vec<TransactionRecord> = self
            .read()
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }

    /// Ids of records that have not reached a terminal status.
    pub fn pending_ids(&self) -> Vec<Uuid> {
        self.read()
            .iter()
            .filter(|record| !record.is_closed())
            .map(|record| record.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Read the persisted document back without touching the in-process copy.
    pub fn probe(&self) -> StorageResult<()> {
        self.backend.load(TRANSACTIONS_KEY).map(|_| ())
    }

    fn persist(&self, records: &[TransactionRecord]) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        self.backend.save(TRANSACTIONS_KEY, &bytes)
    }

    // A panicking writer never leaves a half-applied vector behind, so the
    // poisoned contents are still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Vec<TransactionRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<TransactionRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Decode a persisted document. The flag is true when the result differs
/// from what was stored and should be written back.
fn decode_collection(bytes: &[u8]) -> (Vec<TransactionRecord>, bool) {
    let entries: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "Persisted transactions are corrupt, reseeding");
            return (seed_records(Utc::now()), true);
        }
    };

    if entries.is_empty() {
        tracing::info!("Persisted transactions are empty, seeding");
        return (seed_records(Utc::now()), true);
    }

    let mut dirty = false;
    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<TransactionRecord>(entry) {
            Ok(mut record) => {
                if record.normalize() {
                    tracing::warn!(id = %record.id, status = %record.status, "Normalized stored record");
                    dirty = true;
                }
                records.push(record);
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping undecodable transaction record");
                dirty = true;
            }
        }
    }
    (records, dirty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::record::BridgeRequest;
    use crate::storage::{FileBackend, MemoryBackend, StorageError, StoragePaths};
    use std::env;
    use std::time::{Duration, Instant};

    fn empty_store() -> (TransactionStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let store = TransactionStore::open(backend.clone()).unwrap();
        (store, backend)
    }

    fn record(source: ChainKey, dest: ChainKey, amount: &str) -> TransactionRecord {
        TransactionRecord::new(
            &BridgeRequest {
                source_chain: source,
                dest_chain: dest,
                amount: amount.to_string(),
                privacy_requested: false,
                recipient: None,
            },
            None,
        )
    }

    #[test]
    fn absent_data_is_seeded_and_persisted() {
        let (store, backend) = empty_store();
        assert_eq!(store.len(), 3);

        let persisted = backend.load(TRANSACTIONS_KEY).unwrap().unwrap();
        let decoded: Vec<TransactionRecord> = serde_json::from_slice(&persisted).unwrap();
        assert_eq!(decoded.len(), 3);
    }

    #[test]
    fn reseeding_is_shape_stable() {
        let (a, _) = empty_store();
        let (b, _) = empty_store();
        let shape = |store: &TransactionStore| {
            store
                .list()
                .into_iter()
                .map(|r| (r.amount, r.status, r.privacy_requested))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&a), shape(&b));
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (store, _) = empty_store();
        let r = record(ChainKey::ArbitrumSepolia, ChainKey::EthereumSepolia, "42.5");
        store.put(r.clone()).await.unwrap();
        assert_eq!(store.get(r.id), Some(r.clone()));

        let mut updated = r.clone();
        updated.advance(BridgeStatus::Confirming).unwrap();
        store.put(updated.clone()).await.unwrap();
        assert_eq!(store.get(r.id).unwrap().status, BridgeStatus::Confirming);
        assert_eq!(store.len(), 4);
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (store, _) = empty_store();
        store
            .put(record(ChainKey::EthereumSepolia, ChainKey::ArbitrumSepolia, "1"))
            .await
            .unwrap();

        let listed = store.list();
        assert_eq!(listed[0].amount, "1");
        for pair in listed.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn filter_by_status_and_chain() {
        let (store, _) = empty_store();

        let completed = store.list_filtered(&TransactionFilter {
            status: Some(BridgeStatus::Completed),
            chain: None,
        });
        assert_eq!(completed.len(), 2);

        // Chain matches either side of the transfer
        let eth = store.list_filtered(&TransactionFilter {
            status: None,
            chain: Some(ChainKey::EthereumSepolia),
        });
        assert_eq!(eth.len(), 3);

        let confirming_arb = store.list_filtered(&TransactionFilter {
            status: Some(BridgeStatus::Confirming),
            chain: Some(ChainKey::ArbitrumSepolia),
        });
        assert_eq!(confirming_arb.len(), 1);
        assert_eq!(confirming_arb[0].amount, "2500");

        assert!(store
            .list_filtered(&TransactionFilter {
                status: Some(BridgeStatus::Failed),
                chain: None,
            })
            .is_empty());
    }

    #[test]
    fn corrupt_document_falls_back_to_seed() {
        let backend = Arc::new(MemoryBackend::new());
        backend.save(TRANSACTIONS_KEY, b"{not json").unwrap();

        let store = TransactionStore::open(backend.clone()).unwrap();
        assert_eq!(store.len(), 3);

        // Seed replaced the corrupt bytes
        let persisted = backend.load(TRANSACTIONS_KEY).unwrap().unwrap();
        assert!(serde_json::from_slice::<Vec<TransactionRecord>>(&persisted).is_ok());
    }

    #[test]
    fn bad_entries_are_skipped_and_records_normalized() {
        let backend = Arc::new(MemoryBackend::new());
        let doc = r#"[
            {"id": "4b1c7d36-0d3f-4d59-9a43-8b1d1a2b3c4d",
             "sourceChain": "arbitrum-sepolia", "destChain": "ethereum-sepolia",
             "amount": "7", "status": "bridging", "stageIndex": 1,
             "createdAt": "2026-01-01T00:00:00Z", "legacyField": true},
            {"amount": "missing everything else"}
        ]"#;
        backend.save(TRANSACTIONS_KEY, doc.as_bytes()).unwrap();

        let store = TransactionStore::open(backend).unwrap();
        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].stage_index, 3);
        assert_eq!(store.pending_ids(), vec![listed[0].id]);
    }

    #[tokio::test]
    async fn survives_restart_on_file_backend() {
        let root = env::temp_dir().join(format!("test-tx-store-{}", uuid::Uuid::new_v4()));
        let paths = StoragePaths::new(&root);

        let r = record(ChainKey::ArbitrumSepolia, ChainKey::EthereumSepolia, "9");
        {
            let backend = Arc::new(FileBackend::open(paths.clone()).unwrap());
            let store = TransactionStore::open(backend).unwrap();
            store.put(r.clone()).await.unwrap();
        }

        let backend = Arc::new(FileBackend::open(paths).unwrap());
        let store = TransactionStore::open(backend).unwrap();
        assert_eq!(store.get(r.id), Some(r));
        assert_eq!(store.len(), 4);

        let _ = std::fs::remove_dir_all(root);
    }

    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn load(&self, _: &str) -> StorageResult<Option<Vec<u8>>> {
            Ok(Some(b"[]".to_vec()))
        }

        fn save(&self, _: &str, _: &[u8]) -> StorageResult<()> {
            Err(StorageError::Poisoned)
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    async fn failed_write_is_not_visible() {
        let backend = Arc::new(MemoryBackend::new());
        let store = TransactionStore::open(backend).unwrap();
        let before = store.len();

        // Swap to a backend that rejects writes
        let failing = TransactionStore {
            backend: Arc::new(FailingBackend),
            records: RwLock::new(store.list()),
            writer: Mutex::new(()),
        };
        let r = record(ChainKey::ArbitrumSepolia, ChainKey::EthereumSepolia, "3");
        assert!(failing.put(r.clone()).await.is_err());
        assert!(failing.get(r.id).is_none());
        assert_eq!(failing.len(), before);
    }

    /// Memory backend whose saves take a while.
    struct SlowBackend {
        inner: MemoryBackend,
        delay: Duration,
    }

    impl StorageBackend for SlowBackend {
        fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
            self.inner.load(key)
        }

        fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
            std::thread::sleep(self.delay);
            self.inner.save(key, bytes)
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reads_do_not_wait_for_a_slow_write() {
        let backend = Arc::new(SlowBackend {
            inner: MemoryBackend::new(),
            delay: Duration::from_millis(400),
        });
        let store = Arc::new(TransactionStore::open(backend).unwrap());

        let r = record(ChainKey::ArbitrumSepolia, ChainKey::EthereumSepolia, "11");
        let writer = {
            let store = Arc::clone(&store);
            let r = r.clone();
            tokio::spawn(async move { store.put(r).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        assert!(store.get(r.id).is_none());
        assert_eq!(store.list().len(), 3);
        assert_eq!(store.pending_ids().len(), 1);
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(!writer.is_finished());

        writer.await.unwrap().unwrap();
        assert_eq!(store.get(r.id), Some(r));
    }

    #[tokio::test]
    async fn concurrent_puts_keep_every_record() {
        let (store, _) = empty_store();
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for amount in ["1", "2", "3", "4", "5"] {
            let store = Arc::clone(&store);
            let r = record(ChainKey::ArbitrumSepolia, ChainKey::EthereumSepolia, amount);
            handles.push(tokio::spawn(async move { store.put(r).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn public_record_left_in_encrypting_loads_as_confirming() {
        let backend = Arc::new(MemoryBackend::new());
        let doc = r#"[
            {"id": "9a0e4f52-1c2b-4f6a-8d3e-5b7c9d1e2f30",
             "sourceChain": "ethereum-sepolia", "destChain": "arbitrum-sepolia",
             "amount": "12", "status": "encrypting", "stageIndex": 1,
             "privacyRequested": false,
             "createdAt": "2026-01-01T00:00:00Z"}
        ]"#;
        backend.save(TRANSACTIONS_KEY, doc.as_bytes()).unwrap();

        let store = TransactionStore::open(backend.clone()).unwrap();
        let record = &store.list()[0];
        assert_eq!(record.status, BridgeStatus::Confirming);
        assert_eq!(record.stage_index, 2);
        assert_eq!(store.pending_ids(), vec![record.id]);

        // Repair is written back
        let persisted = backend.load(TRANSACTIONS_KEY).unwrap().unwrap();
        let decoded: Vec<TransactionRecord> = serde_json::from_slice(&persisted).unwrap();
        assert_eq!(decoded[0].status, BridgeStatus::Confirming);
    }
}
