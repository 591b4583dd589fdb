//! 設定管理
//!
//! RegistryConfig等の設定構造体

use serde::{Deserialize, Serialize};

/// キャッシュストアのバックエンド
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// プロセス内メモリ
    Memory,
    /// SQLiteテーブル（複数プロセスで共有可能）
    #[default]
    Sqlite,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown cache backend: {}", other)),
        }
    }
}

/// レジストリサーバー設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 8090)
    #[serde(default = "default_port")]
    pub port: u16,

    /// データベースURL (デフォルト: "sqlite://pb_data/registry.db")
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// キャッシュバックエンド (デフォルト: sqlite)
    #[serde(default)]
    pub cache_backend: CacheBackend,

    /// 静的ファイルの配信ディレクトリ (デフォルト: "./pb_public")
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    /// プローブのタイムアウト（秒）(デフォルト: 4)
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_database_url() -> String {
    "sqlite://pb_data/registry.db".to_string()
}

fn default_public_dir() -> String {
    "./pb_public".to_string()
}

fn default_probe_timeout() -> u64 {
    4
}

impl RegistryConfig {
    /// バインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            cache_backend: CacheBackend::default(),
            public_dir: default_public_dir(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}
