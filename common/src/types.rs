//! 共通型定義
//!
//! Network, Prover, CacheSnapshot等のコアデータ型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// フルリフレッシュで書き込んだスナップショットのTTL（24時間）
pub const FULL_REFRESH_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// 登録時の差分書き込みで書き込んだスナップショットのTTL（1時間）
pub const INCREMENTAL_TTL: Duration = Duration::from_secs(60 * 60);

/// この経過時間以上のスナップショットはバックグラウンドリフレッシュ対象
pub const STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// 1回のリフレッシュで列挙するエンドポイント数の上限
pub const ENDPOINT_LIST_LIMIT: i64 = 1000;

/// ネットワーク（名前空間）
///
/// ネットワークごとにキャッシュキーとレコードコレクションが1つずつ存在する。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    /// メインネット
    Mainnet,
    /// テストネット
    Testnet,
}

impl Network {
    /// 全ネットワーク
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    /// ネットワーク名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// キャッシュキー兼レコードコレクション名
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Mainnet => "prover_endpoints",
            Self::Testnet => "testnet_prover_endpoints",
        }
    }
}

impl FromStr for Network {
    type Err = String;

    /// ネットワーク名またはコレクション名を受け付ける
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" | "prover_endpoints" => Ok(Self::Mainnet),
            "testnet" | "testnet_prover_endpoints" => Ok(Self::Testnet),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 検証済みプロバー
///
/// プローブ成功時にのみ生成され、キャッシュスナップショット内にだけ存在する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prover {
    /// エンドポイントURL
    pub url: String,
    /// 最低手数料（プローブで得た`minSgxTierFee`）
    #[serde(rename = "minimumGas")]
    pub minimum_gas: i64,
}

/// ネットワークごとのキャッシュスナップショット
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CacheSnapshot {
    /// 最終書き込み時刻（UNIX秒）
    pub timestamp: i64,
    /// 有効なプロバー一覧（順序保持）
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub data: Vec<Prover>,
}

fn deserialize_null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Prover>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Prover>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CacheSnapshot {
    /// 指定時刻で新しいスナップショットを作成
    pub fn new(timestamp: i64, data: Vec<Prover>) -> Self {
        Self { timestamp, data }
    }

    /// `now`時点での経過秒数（時計が戻った場合は0）
    pub fn staleness_secs(&self, now: i64) -> u64 {
        now.saturating_sub(self.timestamp).max(0) as u64
    }

    /// `now`時点でバックグラウンドリフレッシュ対象か
    pub fn is_stale(&self, now: i64) -> bool {
        self.staleness_secs(now) >= STALE_AFTER.as_secs()
    }

    /// URLが一致するプロバーを置き換え、なければ末尾に追加する
    pub fn upsert(&mut self, prover: Prover) {
        match self.data.iter_mut().find(|p| p.url == prover.url) {
            Some(existing) => *existing = prover,
            None => self.data.push(prover),
        }
    }
}

/// 登録済みエンドポイントレコード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointRecord {
    /// 一意識別子
    pub id: Uuid,
    /// エンドポイントURL
    pub url: String,
    /// 所属ネットワーク
    pub network: Network,
    /// 登録日時
    pub created_at: DateTime<Utc>,
}

impl EndpointRecord {
    /// 新しいレコードを作成
    pub fn new(network: Network, url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            network,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prover(url: &str, gas: i64) -> Prover {
        Prover {
            url: url.to_string(),
            minimum_gas: gas,
        }
    }

    #[test]
    fn test_network_namespaces() {
        assert_eq!(Network::Mainnet.namespace(), "prover_endpoints");
        assert_eq!(Network::Testnet.namespace(), "testnet_prover_endpoints");
    }

    #[test]
    fn test_network_from_str_accepts_collection_names() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(
            "testnet_prover_endpoints".parse::<Network>().unwrap(),
            Network::Testnet
        );
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_snapshot_wire_format() {
        let snapshot = CacheSnapshot::new(1_700_000_000, vec![prover("http://a", 100)]);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "timestamp": 1_700_000_000,
                "data": [{"url": "http://a", "minimumGas": 100}]
            })
        );
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_order() {
        let snapshot = CacheSnapshot::new(
            42,
            vec![prover("http://b", 2), prover("http://a", 1), prover("http://c", 3)],
        );
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: CacheSnapshot = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_snapshot_null_data_is_empty() {
        let decoded: CacheSnapshot =
            serde_json::from_str(r#"{"timestamp": 10, "data": null}"#).unwrap();
        assert_eq!(decoded.timestamp, 10);
        assert!(decoded.data.is_empty());
    }

    #[test]
    fn test_staleness_boundary() {
        let now = 1_700_000_000;

        let fresh = CacheSnapshot::new(now - 3599, vec![]);
        assert!(!fresh.is_stale(now));

        let stale = CacheSnapshot::new(now - 3600, vec![]);
        assert!(stale.is_stale(now));

        let older = CacheSnapshot::new(now - 7200, vec![]);
        assert!(older.is_stale(now));
    }

    #[test]
    fn test_staleness_future_timestamp_is_fresh() {
        let snapshot = CacheSnapshot::new(2_000, vec![]);
        assert_eq!(snapshot.staleness_secs(1_000), 0);
        assert!(!snapshot.is_stale(1_000));
    }

    #[test]
    fn test_upsert_replaces_existing_url_in_place() {
        let mut snapshot =
            CacheSnapshot::new(0, vec![prover("http://a", 1), prover("http://b", 2)]);

        snapshot.upsert(prover("http://a", 10));
        snapshot.upsert(prover("http://c", 3));

        assert_eq!(
            snapshot.data,
            vec![prover("http://a", 10), prover("http://b", 2), prover("http://c", 3)]
        );
    }
}
