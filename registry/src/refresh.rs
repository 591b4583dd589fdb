//! 名前空間のフルリフレッシュ
//!
//! 登録済みエンドポイントを全件プローブし直し、結果をTTL 24時間で
//! キャッシュに書き込む。個々のプローブ失敗はスキップするだけで、
//! 失敗扱いになるのは列挙とキャッシュ書き込みのエラーのみ。

use crate::cache::CacheStore;
use crate::db::endpoints::EndpointRepository;
use crate::locks::NamespaceLocks;
use crate::probe::ProverProbe;
use chrono::Utc;
use prover_registry_common::error::RefreshError;
use prover_registry_common::types::{
    CacheSnapshot, Network, Prover, ENDPOINT_LIST_LIMIT, FULL_REFRESH_TTL,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// リフレッシュの実行結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// スナップショットを書き込んだ（有効プロバー数）
    Written(usize),
    /// 登録済みエンドポイントが0件のため書き込まなかった
    NoEndpoints,
    /// 別のリフレッシュが実行中、または既に新しいスナップショットがあるため実行しなかった
    Skipped,
}

/// リフレッシュコーディネーター
#[derive(Clone)]
pub struct RefreshCoordinator {
    records: Arc<dyn EndpointRepository>,
    prober: Arc<dyn ProverProbe>,
    cache: Arc<dyn CacheStore>,
    locks: NamespaceLocks,
}

impl RefreshCoordinator {
    /// 新しいコーディネーターを作成
    pub fn new(
        records: Arc<dyn EndpointRepository>,
        prober: Arc<dyn ProverProbe>,
        cache: Arc<dyn CacheStore>,
        locks: NamespaceLocks,
    ) -> Self {
        Self {
            records,
            prober,
            cache,
            locks,
        }
    }

    /// 名前空間をフルリフレッシュする
    ///
    /// 候補は逐次プローブする。同じURLのレコードが複数あっても結果には1件だけ残る。
    /// 書き込み時点のスナップショットが開始後に更新されていれば、列挙に含まれなかった
    /// プロバー（実行中に登録されたもの）を結果に残す。
    pub async fn refresh(&self, network: Network) -> Result<RefreshOutcome, RefreshError> {
        let namespace = network.namespace();
        let started = Utc::now().timestamp();
        let records = self
            .records
            .list_endpoints(network, ENDPOINT_LIST_LIMIT)
            .await
            .map_err(|e| RefreshError::Enumerate(e.to_string()))?;

        if records.is_empty() {
            debug!(network = %network, "No registered endpoints, skipping cache write");
            return Ok(RefreshOutcome::NoEndpoints);
        }

        let mut seen = HashSet::new();
        let mut provers: Vec<Prover> = Vec::with_capacity(records.len());

        for record in &records {
            if !seen.insert(record.url.as_str()) {
                continue;
            }
            match self.prober.probe(&record.url).await {
                Ok(Some(prover)) => provers.push(prover),
                Ok(None) => {
                    debug!(network = %network, url = %record.url, "Prover disqualified");
                }
                Err(e) => {
                    debug!(network = %network, url = %record.url, error = %e, "Prover probe failed");
                }
            }
        }

        let mut snapshot = CacheSnapshot::new(Utc::now().timestamp(), provers);
        let mut carried = 0;
        {
            let _write = self.locks.write(network).await;

            // プローブ中に登録されたプロバーは列挙結果に含まれないので引き継ぐ
            if let Some(current) = self.cache.get(namespace).await? {
                if current.timestamp >= started {
                    for prover in current.data {
                        if !seen.contains(prover.url.as_str()) {
                            snapshot.upsert(prover);
                            carried += 1;
                        }
                    }
                }
            }

            self.cache
                .set(namespace, &snapshot, FULL_REFRESH_TTL)
                .await?;
        }

        let valid = snapshot.data.len();
        info!(
            network = %network,
            candidates = records.len(),
            valid,
            carried,
            "Prover cache refreshed"
        );
        Ok(RefreshOutcome::Written(valid))
    }

    /// キャッシュが存在しない場合のみリフレッシュする
    ///
    /// 実行中のリフレッシュがあれば完了を待ち、その結果で足りていれば何もしない。
    pub async fn refresh_if_missing(
        &self,
        network: Network,
    ) -> Result<RefreshOutcome, RefreshError> {
        let _gate = self.locks.refresh(network).await;

        if self.cache.get(network.namespace()).await?.is_some() {
            return Ok(RefreshOutcome::Skipped);
        }
        self.refresh(network).await
    }

    /// キャッシュが古い場合のみリフレッシュする（実行中のリフレッシュがあれば待たずに戻る）
    pub async fn refresh_if_stale(
        &self,
        network: Network,
    ) -> Result<RefreshOutcome, RefreshError> {
        let Some(_gate) = self.locks.try_refresh(network) else {
            debug!(network = %network, "Refresh already in progress");
            return Ok(RefreshOutcome::Skipped);
        };

        let now = Utc::now().timestamp();
        if let Some(snapshot) = self.cache.get(network.namespace()).await? {
            if !snapshot.is_stale(now) {
                return Ok(RefreshOutcome::Skipped);
            }
        }
        self.refresh(network).await
    }
}
