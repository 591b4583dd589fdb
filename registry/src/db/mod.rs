//! データベースアクセス層
//!
//! SQLiteデータベースへの接続とマイグレーション

/// エンドポイントレコード管理
pub mod endpoints;

use prover_registry_common::error::{RegistryError, RegistryResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// データベース接続プールを作成し、マイグレーションを実行
pub async fn create_pool(database_url: &str) -> RegistryResult<SqlitePool> {
    ensure_parent_dir(database_url)?;

    let connect_options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| RegistryError::Database(e.to_string()))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .map_err(|e| RegistryError::Database(e.to_string()))?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// マイグレーション実行
pub async fn run_migrations(pool: &SqlitePool) -> RegistryResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| RegistryError::Database(format!("Migration failed: {}", e)))
}

/// SQLiteファイルはディレクトリが存在しないと作成できないため、先に作成しておく
fn ensure_parent_dir(database_url: &str) -> RegistryResult<()> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    // `sqlite::memory:` のような特殊指定はスキップ
    if path.starts_with(':') {
        return Ok(());
    }

    let normalized = path.trim_start_matches("//");
    let path_without_params = normalized.split('?').next().unwrap_or(normalized);
    if let Some(parent) = std::path::Path::new(path_without_params).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RegistryError::Database(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// テスト用のインメモリDBプールを作成する
///
/// `sqlite::memory:` は接続ごとに別DBになるため接続数を1に固定する。
#[cfg(test)]
pub(crate) async fn create_memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}
