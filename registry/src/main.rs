//! Prover Registry Server Entry Point

use clap::Parser;
use prover_registry::{
    cache::{CacheStore, MemoryCacheStore, SqliteCacheStore},
    cli::Cli,
    config::load_config,
    db::{self, endpoints::SqliteEndpointRepository},
    logging,
    probe::HttpProber,
    provers::ProverService,
    refresh::RefreshOutcome,
    server,
    shutdown::ShutdownController,
    AppState,
};
use prover_registry_common::{config::CacheBackend, types::Network};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 期限切れキャッシュの削除間隔
const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();

    // ファイル出力を使う場合はガードをプロセス終了まで保持する
    let _log_guard = logging::init().expect("Failed to initialize logging");

    info!("Prover Registry v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config();
    info!(
        database_url = %config.database_url,
        cache_backend = ?config.cache_backend,
        "Configuration loaded"
    );

    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    let shutdown = ShutdownController::default();

    let cache: Arc<dyn CacheStore> = match config.cache_backend {
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
        CacheBackend::Sqlite => {
            let store = SqliteCacheStore::new(db_pool.clone());
            store.spawn_purger(CACHE_PURGE_INTERVAL, shutdown.clone());
            Arc::new(store)
        }
    };

    let prober = HttpProber::with_timeout(Duration::from_secs(config.probe_timeout_secs))
        .expect("Failed to build HTTP client");
    let records = SqliteEndpointRepository::new(db_pool);
    let provers = ProverService::new(cache, Arc::new(records), Arc::new(prober));

    // 起動直後の最初のリクエストを待たせないよう、空のキャッシュを先に埋めておく
    for network in Network::ALL {
        let refresher = provers.refresher().clone();
        tokio::spawn(async move {
            match refresher.refresh_if_missing(network).await {
                Ok(RefreshOutcome::Written(valid)) => {
                    info!(network = %network, valid, "Prover cache warmed up");
                }
                Ok(_) => {}
                Err(e) => warn!(network = %network, error = %e, "Cache warmup failed"),
            }
        });
    }

    let state = AppState {
        provers,
        public_dir: config.public_dir.clone().into(),
        shutdown,
    };

    server::run(state, &config.bind_addr())
        .await
        .expect("Server error");
}
