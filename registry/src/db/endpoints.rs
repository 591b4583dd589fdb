//! エンドポイントレコードのデータベース操作
//!
//! ネットワークごとに1テーブル（`prover_endpoints` / `testnet_prover_endpoints`）。

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use prover_registry_common::types::{EndpointRecord, Network};
use sqlx::SqlitePool;
use uuid::Uuid;

/// エンドポイントレコードのRepository trait
#[async_trait]
pub trait EndpointRepository: Send + Sync {
    /// 作成日時の昇順で最大`limit`件のレコードを取得
    async fn list_endpoints(
        &self,
        network: Network,
        limit: i64,
    ) -> Result<Vec<EndpointRecord>, sqlx::Error>;
    /// URLでレコードを検索
    async fn find_by_url(
        &self,
        network: Network,
        url: &str,
    ) -> Result<Option<EndpointRecord>, sqlx::Error>;
    /// レコードを登録（同じネットワークに同じURLがあれば一意制約違反）
    async fn create_endpoint(&self, record: &EndpointRecord) -> Result<(), sqlx::Error>;
}

/// SQLite実装
#[derive(Clone)]
pub struct SqliteEndpointRepository {
    pool: SqlitePool,
}

impl SqliteEndpointRepository {
    /// 新しいRepositoryを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EndpointRepository for SqliteEndpointRepository {
    async fn list_endpoints(
        &self,
        network: Network,
        limit: i64,
    ) -> Result<Vec<EndpointRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT id, url, created_at FROM {} ORDER BY created_at ASC LIMIT ?",
            network.namespace()
        );
        let rows = sqlx::query_as::<_, EndpointRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.into_record(network)).collect()
    }

    async fn find_by_url(
        &self,
        network: Network,
        url: &str,
    ) -> Result<Option<EndpointRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT id, url, created_at FROM {} WHERE url = ? LIMIT 1",
            network.namespace()
        );
        let row = sqlx::query_as::<_, EndpointRow>(&sql)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_record(network)).transpose()
    }

    async fn create_endpoint(&self, record: &EndpointRecord) -> Result<(), sqlx::Error> {
        let sql = format!(
            "INSERT INTO {} (id, url, created_at) VALUES (?, ?, ?)",
            record.network.namespace()
        );
        sqlx::query(&sql)
            .bind(record.id.to_string())
            .bind(&record.url)
            .bind(record.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// --- Internal Row Types ---

#[derive(sqlx::FromRow)]
struct EndpointRow {
    id: String,
    url: String,
    // 固定長のRFC3339文字列なので文字列比較で並び替えできる
    created_at: String,
}

impl EndpointRow {
    fn into_record(self, network: Network) -> Result<EndpointRecord, sqlx::Error> {
        let id = Uuid::parse_str(&self.id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(EndpointRecord {
            id,
            url: self.url,
            network,
            created_at,
        })
    }
}
