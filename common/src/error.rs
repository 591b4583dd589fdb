//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! プローブ・キャッシュ・リフレッシュの各エラーは呼び出し元で握りつぶされる
//! ことがあるため個別の型に分け、登録APIに返すものだけを`RegistryError`に集約する。

use thiserror::Error;

/// 単一エンドポイントのヘルスチェック失敗
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// 接続・タイムアウト等の通信エラー
    #[error("error making HTTP request: {0}")]
    Request(String),

    /// 2xx以外のステータス
    #[error("received non-OK HTTP status: {0}")]
    Status(String),

    /// レスポンスボディのデコード失敗
    #[error("error decoding response body: {0}")]
    Decode(String),
}

/// キャッシュストアのエラー
#[derive(Debug, Error)]
pub enum CacheError {
    /// 読み込み失敗
    #[error("cache read error: {0}")]
    Read(String),

    /// 書き込み失敗
    #[error("cache write error: {0}")]
    Write(String),

    /// スナップショットのシリアライズ/デシリアライズ失敗
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 名前空間のフルリフレッシュ失敗
#[derive(Debug, Error)]
pub enum RefreshError {
    /// 候補エンドポイントの列挙に失敗
    #[error("failed to enumerate endpoints: {0}")]
    Enumerate(String),

    /// スナップショットの書き込みに失敗
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// 登録時のバリデーション失敗
#[derive(Debug, Error)]
pub enum ValidationError {
    /// URLが不正
    #[error("error parsing URL {url:?}: {reason}")]
    InvalidUrl {
        /// 入力されたURL
        url: String,
        /// 理由
        reason: String,
    },

    /// プローブ失敗（到達不能・不正なレスポンス）
    #[error("failed to create prover {url}: {source}")]
    Unreachable {
        /// 対象URL
        url: String,
        /// プローブエラー
        #[source]
        source: ProbeError,
    },

    /// 到達可能だが手数料を公開していない
    #[error("failed to create prover {url}: endpoint does not report minSgxTierFee")]
    Disqualified {
        /// 対象URL
        url: String,
    },

    /// キャッシュ更新失敗
    #[error("failed to cache prover {url}: {source}")]
    Cache {
        /// 対象URL
        url: String,
        /// キャッシュエラー
        #[source]
        source: CacheError,
    },
}

/// 登録APIのエラー型
#[derive(Debug, Error)]
pub enum RegistryError {
    /// バリデーションエラー
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 同一URLのレコードが既に存在
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 未知のコレクション
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// データベースエラー
    #[error("Database error: {0}")]
    Database(String),
}

impl RegistryError {
    /// 外部クライアント向けのメッセージ
    ///
    /// 登録失敗は対象エンドポイントを含めて返す。ストレージ起因のエラーは詳細を隠す。
    pub fn external_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::Cache { url, .. }) => {
                format!("failed to create prover {}", url)
            }
            Self::Validation(err) => err.to_string(),
            Self::Conflict(_) | Self::UnknownCollection(_) => self.to_string(),
            Self::Database(_) => "Database error".to_string(),
        }
    }
}

/// Result型エイリアス
pub type RegistryResult<T> = Result<T, RegistryError>;
