//! プロバーエンドポイントのヘルスチェック
//!
//! `GET {url}/status` を1回だけ送り、`minSgxTierFee` を公開している
//! エンドポイントだけを`Prover`として返す。リトライはせず、タイムアウトのみで
//! 遅いエンドポイントから保護する。

use async_trait::async_trait;
use prover_registry_common::error::ProbeError;
use prover_registry_common::protocol::ProverStatus;
use prover_registry_common::types::Prover;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// プローブのデフォルトタイムアウト（秒）
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 4;

/// 単一エンドポイントのプローブ
#[async_trait]
pub trait ProverProbe: Send + Sync {
    /// エンドポイントをチェックする
    ///
    /// 到達可能だが手数料を公開していない場合は`Ok(None)`。
    async fn probe(&self, url: &str) -> Result<Option<Prover>, ProbeError>;
}

/// HTTPによるプローブ
///
/// `Client`は起動時に1度だけ作成し、全リクエストで共有する。
#[derive(Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// デフォルトタイムアウトで作成
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    /// タイムアウトを指定して作成
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProverProbe for HttpProber {
    async fn probe(&self, url: &str) -> Result<Option<Prover>, ProbeError> {
        let status_url = format!("{}/status", url);

        let response = self
            .client
            .get(&status_url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ProbeError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProbeError::Status(response.status().to_string()));
        }

        let status = response
            .json::<ProverStatus>()
            .await
            .map_err(|e| ProbeError::Decode(e.to_string()))?;

        match status.min_sgx_tier_fee {
            Some(fee) => Ok(Some(Prover {
                url: url.to_string(),
                minimum_gas: fee,
            })),
            None => {
                debug!(url = %url, "Prover does not report minSgxTierFee");
                Ok(None)
            }
        }
    }
}
