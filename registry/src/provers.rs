//! 有効プロバーの提供と登録
//!
//! 読み込みはstale-while-revalidate:
//! - キャッシュなし → 同期でフルリフレッシュしてから返す
//! - 1時間以上経過 → 手元のデータを即座に返し、バックグラウンドでリフレッシュ
//! - それ以外 → そのまま返す
//!
//! 登録時は新しいエンドポイント1件だけをプローブし、既存スナップショットに
//! 追記してTTL 1時間で書き戻す（フルリフレッシュは行わない）。

use crate::cache::CacheStore;
use crate::db::endpoints::EndpointRepository;
use crate::locks::NamespaceLocks;
use crate::probe::ProverProbe;
use crate::refresh::{RefreshCoordinator, RefreshOutcome};
use chrono::Utc;
use prover_registry_common::error::{RegistryError, RegistryResult, ValidationError};
use prover_registry_common::types::{
    EndpointRecord, Network, Prover, ENDPOINT_LIST_LIMIT, INCREMENTAL_TTL,
};
use reqwest::Url;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// プロバーサービス
#[derive(Clone)]
pub struct ProverService {
    cache: Arc<dyn CacheStore>,
    records: Arc<dyn EndpointRepository>,
    prober: Arc<dyn ProverProbe>,
    refresher: RefreshCoordinator,
    locks: NamespaceLocks,
}

impl ProverService {
    /// 新しいサービスを作成
    pub fn new(
        cache: Arc<dyn CacheStore>,
        records: Arc<dyn EndpointRepository>,
        prober: Arc<dyn ProverProbe>,
    ) -> Self {
        let locks = NamespaceLocks::new();
        let refresher =
            RefreshCoordinator::new(records.clone(), prober.clone(), cache.clone(), locks.clone());
        Self {
            cache,
            records,
            prober,
            refresher,
            locks,
        }
    }

    /// リフレッシュコーディネーター
    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    /// 有効なプロバー一覧を取得
    ///
    /// 呼び出し元にエラーは返さず、内部エラーは空リストに落とす。
    pub async fn valid_provers(&self, network: Network) -> Vec<Prover> {
        let namespace = network.namespace();

        let cached = match self.cache.get(namespace).await {
            Ok(cached) => cached,
            Err(e) => {
                error!(network = %network, error = %e, "Failed to read prover cache");
                return Vec::new();
            }
        };

        let snapshot = match cached {
            Some(snapshot) => snapshot,
            None => {
                if let Err(e) = self.refresher.refresh_if_missing(network).await {
                    warn!(network = %network, error = %e, "Prover refresh failed");
                    return Vec::new();
                }
                match self.cache.get(namespace).await {
                    Ok(Some(snapshot)) => return snapshot.data,
                    Ok(None) => return Vec::new(),
                    Err(e) => {
                        error!(network = %network, error = %e, "Failed to read prover cache");
                        return Vec::new();
                    }
                }
            }
        };

        if snapshot.is_stale(Utc::now().timestamp()) {
            self.spawn_background_refresh(network);
        }

        snapshot.data
    }

    /// バックグラウンドでリフレッシュを開始する
    ///
    /// 完了は待たず、失敗はログに残すだけ。
    pub fn spawn_background_refresh(&self, network: Network) -> JoinHandle<()> {
        let refresher = self.refresher.clone();
        tokio::spawn(async move {
            match refresher.refresh_if_stale(network).await {
                Ok(RefreshOutcome::Written(valid)) => {
                    info!(network = %network, valid, "Background refresh completed");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(network = %network, error = %e, "Background refresh failed");
                }
            }
        })
    }

    /// レコード作成前のフック
    ///
    /// URLを検証してプローブし、成功したプロバーをキャッシュに追記する。
    /// エラーを返した場合はレコード作成を中止する。
    pub async fn before_create(
        &self,
        network: Network,
        raw_url: &str,
    ) -> Result<Prover, ValidationError> {
        let url = parse_endpoint_url(raw_url)?;

        let prover = match self.prober.probe(&url).await {
            Ok(Some(prover)) => prover,
            Ok(None) => return Err(ValidationError::Disqualified { url }),
            Err(source) => return Err(ValidationError::Unreachable { url, source }),
        };

        let namespace = network.namespace();
        let cache_error = |source| ValidationError::Cache {
            url: url.clone(),
            source,
        };
        {
            let _write = self.locks.write(network).await;
            let mut snapshot = self
                .cache
                .get(namespace)
                .await
                .map_err(cache_error)?
                .unwrap_or_default();
            snapshot.upsert(prover.clone());
            snapshot.timestamp = Utc::now().timestamp();
            self.cache
                .set(namespace, &snapshot, INCREMENTAL_TTL)
                .await
                .map_err(cache_error)?;
        }

        info!(network = %network, url = %url, "Created the prover and added to the cache");
        Ok(prover)
    }

    /// エンドポイントを登録する
    ///
    /// 作成前フックが失敗した場合は何も永続化しない。同じネットワークに同じURLが
    /// 登録済み（同時登録を含む）なら`RegistryError::Conflict`。
    pub async fn register(&self, network: Network, raw_url: &str) -> RegistryResult<EndpointRecord> {
        let url = parse_endpoint_url(raw_url)?;

        let already_registered =
            || RegistryError::Conflict(format!("prover {} is already registered", url));

        match self.records.find_by_url(network, &url).await {
            Ok(Some(_)) => return Err(already_registered()),
            Ok(None) => {}
            Err(e) => return Err(RegistryError::Database(e.to_string())),
        }

        self.before_create(network, &url).await?;

        // 同時登録は一意インデックスで弾かれる
        let record = EndpointRecord::new(network, url.clone());
        match self.records.create_endpoint(&record).await {
            Ok(()) => Ok(record),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(already_registered())
            }
            Err(e) => Err(RegistryError::Database(e.to_string())),
        }
    }

    /// 登録済みレコード一覧
    pub async fn list_records(&self, network: Network) -> RegistryResult<Vec<EndpointRecord>> {
        self.records
            .list_endpoints(network, ENDPOINT_LIST_LIMIT)
            .await
            .map_err(|e| RegistryError::Database(e.to_string()))
    }
}

/// 登録URLの検証
///
/// http/httpsの絶対URLのみ受け付ける。戻り値は前後の空白を除いた入力そのもの。
fn parse_endpoint_url(raw_url: &str) -> Result<String, ValidationError> {
    let trimmed = raw_url.trim();
    let invalid = |reason: String| ValidationError::InvalidUrl {
        url: raw_url.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("URL is required".to_string()));
    }

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme: {}", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(trimmed.to_string())
}
