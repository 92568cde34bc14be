// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use solcipher_bridge::{
    api::router,
    blockchain::{
        load_signer, BalanceReader, ChainKey, DetachedWallet, EvmChainReader, SignerWallet, Wallet,
        DEFAULT_BALANCE_TTL,
    },
    bridge::{
        ApprovalCoordinator, BridgeOrchestrator, FixedStageTiming, HttpProtectionService,
        LiveProtector, Protector, SimulatedProtector,
    },
    config::{BridgeConfig, LogFormat, ProtectorKind, StorageKind, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::{
        FileBackend, MemoryBackend, RedbBackend, StorageBackend, StoragePaths, TransactionStore,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Cached balances kept per (chain, owner).
const BALANCE_CACHE_CAPACITY: usize = 256;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    match LogFormat::from_env() {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn open_backend(config: &BridgeConfig) -> Arc<dyn StorageBackend> {
    let paths = StoragePaths::new(&config.data_dir);
    match config.storage {
        StorageKind::File => {
            Arc::new(FileBackend::open(paths).expect("Failed to open data directory"))
        }
        StorageKind::Redb => Arc::new(
            RedbBackend::open(&paths.redb_file()).expect("Failed to open redb database"),
        ),
        StorageKind::Memory => Arc::new(MemoryBackend::new()),
    }
}

async fn open_wallet(config: &BridgeConfig) -> Arc<dyn Wallet> {
    let Some(key_path) = &config.wallet_key_path else {
        tracing::warn!("No wallet key configured; approvals and live protection are unavailable");
        return Arc::new(DetachedWallet);
    };

    let signer = load_signer(key_path).expect("Failed to load wallet key");
    let wallet = SignerWallet::new(
        signer,
        config.wallet_rpc_urls(),
        ChainKey::ArbitrumSepolia.chain_id(),
    )
    .expect("Failed to configure wallet");
    wallet.connect().await.expect("Failed to connect wallet");
    Arc::new(wallet)
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = BridgeConfig::from_env();
    tracing::info!(
        storage = ?config.storage,
        protector = ?config.protector,
        data_dir = %config.data_dir.display(),
        "Starting SolCipher bridge"
    );

    let store = Arc::new(
        TransactionStore::open(open_backend(&config)).expect("Failed to load transactions"),
    );
    tracing::info!(
        backend = store.backend_name(),
        transactions = store.len(),
        "Transaction store ready"
    );

    let wallet = open_wallet(&config).await;
    let chain_reader =
        Arc::new(EvmChainReader::new(&config.rpc_urls).expect("Invalid RPC configuration"));
    let balances = Arc::new(
        BalanceReader::new(chain_reader.clone(), BALANCE_CACHE_CAPACITY, DEFAULT_BALANCE_TTL)
            .with_read_timeout(config.chain_read_timeout),
    );
    let approvals = Arc::new(
        ApprovalCoordinator::new(chain_reader, wallet.clone())
            .with_read_timeout(config.chain_read_timeout),
    );

    let live_protector = match config.protector {
        ProtectorKind::Live => {
            let url = config
                .protection_service_url
                .as_deref()
                .expect("PROTECTION_SERVICE_URL is required in live mode");
            let service =
                HttpProtectionService::new(url).expect("Invalid protection service URL");
            Some(Arc::new(LiveProtector::new(wallet.clone(), Arc::new(service))))
        }
        ProtectorKind::Simulated => None,
    };
    let protector: Arc<dyn Protector> = match &live_protector {
        Some(live) => live.clone(),
        None => Arc::new(SimulatedProtector::new(
            config.simulated_latency_min,
            config.simulated_latency_max,
        )),
    };

    let orchestrator = Arc::new(
        BridgeOrchestrator::new(store, protector, Arc::new(FixedStageTiming::default()))
            .with_wallet(wallet.clone())
            .with_stage_timeout(config.stage_timeout),
    );
    let resumed = orchestrator.resume_pending();
    if resumed > 0 {
        tracing::info!(resumed, "Resumed pending bridge transactions");
    }

    let mut state = AppState::new(
        orchestrator.clone(),
        approvals,
        balances,
        wallet,
        config.bridge_spender,
    );
    if let Some(live) = live_protector {
        state = state.with_live_protector(live);
    }
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");
    tracing::info!(%addr, "SolCipher bridge listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await
        .expect("HTTP server failed");

    orchestrator.shutdown().await;
    tracing::info!("SolCipher bridge stopped");
}
