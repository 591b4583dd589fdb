//! プロセス内メモリのキャッシュストア

use super::{decode_snapshot, encode_snapshot, CacheStore};
use async_trait::async_trait;
use prover_registry_common::error::CacheError;
use prover_registry_common::types::CacheSnapshot;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// メモリキャッシュストア
///
/// 期限切れエントリは読み込み時に削除する。
#[derive(Clone, Default)]
pub struct MemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryCacheStore {
    /// 新しいストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    async fn live_value(&self, namespace: &str) -> Option<(String, Instant)> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(namespace) {
                Some(entry) if entry.expires_at > now => {
                    return Some((entry.value.clone(), entry.expires_at))
                }
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(namespace)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            entries.remove(namespace);
        }
        None
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, namespace: &str) -> Result<Option<CacheSnapshot>, CacheError> {
        match self.live_value(namespace).await {
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
        let mut entries = self.entries.write().await;
        entries.insert(
            namespace.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn ttl(&self, namespace: &str) -> Result<Option<Duration>, CacheError> {
        Ok(self
            .live_value(namespace)
            .await
            .map(|(_, expires_at)| expires_at.saturating_duration_since(Instant::now())))
    }
}
