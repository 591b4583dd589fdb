//! 通信プロトコル定義
//!
//! プロバーエンドポイント・管理APIとの通信メッセージ

use serde::{Deserialize, Serialize};

use crate::types::EndpointRecord;

/// プロバーの`GET /status`レスポンス
///
/// `minSgxTierFee`以外のフィールドは無視する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProverStatus {
    /// SGXティアの最低手数料（未設定のプロバーは対象外）
    #[serde(rename = "minSgxTierFee", default)]
    pub min_sgx_tier_fee: Option<i64>,
}

/// レコード作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateRecordRequest {
    /// エンドポイントURL
    pub url: String,
}

/// レコード一覧レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordListResponse {
    /// レコード一覧（作成日時昇順）
    pub items: Vec<EndpointRecord>,
    /// 件数
    pub total: usize,
}

impl From<Vec<EndpointRecord>> for RecordListResponse {
    fn from(items: Vec<EndpointRecord>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}
