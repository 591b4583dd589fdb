//! TTL付きキャッシュストア
//!
//! ネットワークごとに1キー（`prover_endpoints` / `testnet_prover_endpoints`）で
//! シリアライズ済みの`CacheSnapshot`を保持する。部分更新はなく、書き込みは常に
//! スナップショット全体の上書きで、TTLもその時点から数え直す。

mod memory;
mod sqlite;

pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;

use async_trait::async_trait;
use prover_registry_common::error::CacheError;
use prover_registry_common::types::CacheSnapshot;
use std::time::Duration;

/// キャッシュストアのtrait
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// スナップショットを取得（未書き込み・期限切れは`None`）
    async fn get(&self, namespace: &str) -> Result<Option<CacheSnapshot>, CacheError>;

    /// スナップショットを無条件に上書きし、有効期限を`ttl`後に設定する
    async fn set(
        &self,
        namespace: &str,
        snapshot: &CacheSnapshot,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// 残りTTL（キーが存在しない場合は`None`）
    ///
    /// 読み書きの経路では使わない点検用のフック。書き込みごとにTTLが数え直される
    /// こと（フルリフレッシュ24時間、登録時1時間）の確認に使う。
    async fn ttl(&self, namespace: &str) -> Result<Option<Duration>, CacheError>;
}

/// スナップショットをワイヤーフォーマット（JSON文字列）に変換
pub fn encode_snapshot(snapshot: &CacheSnapshot) -> Result<String, CacheError> {
    Ok(serde_json::to_string(snapshot)?)
}

/// ワイヤーフォーマットからスナップショットを復元
pub fn decode_snapshot(raw: &str) -> Result<CacheSnapshot, CacheError> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prover_registry_common::types::Prover;

    #[test]
    fn test_encode_decode_snapshot() {
        let snapshot = CacheSnapshot::new(
            1_700_000_000,
            vec![
                Prover {
                    url: "http://a".to_string(),
                    minimum_gas: 10,
                },
                Prover {
                    url: "http://b".to_string(),
                    minimum_gas: 20,
                },
            ],
        );

        let raw = encode_snapshot(&snapshot).unwrap();
        assert_eq!(decode_snapshot(&raw).unwrap(), snapshot);
    }

    #[test]
    fn test_decode_garbage_is_serialization_error() {
        let result = decode_snapshot("not json");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }
}
