//! SQLiteテーブルを使ったキャッシュストア
//!
//! 同じDBファイルを参照する複数プロセス間で共有できる。有効期限はUNIXミリ秒で保持する。

use super::{decode_snapshot, encode_snapshot, CacheStore};
use crate::shutdown::ShutdownController;
use async_trait::async_trait;
use chrono::Utc;
use prover_registry_common::error::CacheError;
use prover_registry_common::types::CacheSnapshot;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// SQLiteキャッシュストア
#[derive(Clone)]
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    /// 新しいストアを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 期限切れエントリを削除し、削除件数を返す
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM cache_entries WHERE expires_at <= ?")
            .bind(now_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| CacheError::Write(e.to_string()))?;

        let purged = result.rows_affected();
        if purged > 0 {
            debug!(purged, "Purged expired cache entries");
        }
        Ok(purged)
    }

    /// 期限切れエントリを定期的に削除するタスクを起動する
    ///
    /// シャットダウン要求を受けると終了する。
    pub fn spawn_purger(&self, period: Duration, shutdown: ShutdownController) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = store.purge_expired().await {
                            warn!(error = %e, "Failed to purge expired cache entries");
                        }
                    }
                    _ = shutdown.wait() => break,
                }
            }
        })
    }

    async fn live_row(&self, namespace: &str) -> Result<Option<(String, i64)>, CacheError> {
        sqlx::query_as::<_, (String, i64)>(
            "SELECT value, expires_at FROM cache_entries WHERE key = ? AND expires_at > ?",
        )
        .bind(namespace)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CacheError::Read(e.to_string()))
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, namespace: &str) -> Result<Option<CacheSnapshot>, CacheError> {
        match self.live_row(namespace).await? {
            Some((raw, _)) => decode_snapshot(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        namespace: &str,
        snapshot: &CacheSnapshot,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let value = encode_snapshot(snapshot)?;
        let expires_at = now_millis().saturating_add(ttl.as_millis() as i64);

        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(namespace)
        .bind(&value)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CacheError::Write(e.to_string()))?;

        Ok(())
    }

    async fn ttl(&self, namespace: &str) -> Result<Option<Duration>, CacheError> {
        Ok(self.live_row(namespace).await?.map(|(_, expires_at)| {
            Duration::from_millis(expires_at.saturating_sub(now_millis()).max(0) as u64)
        }))
    }
}
