//! 有効プロバー一覧APIハンドラー
//!
//! どちらのエンドポイントも常に200を返す（最悪でも空配列）。

use crate::AppState;
use axum::{extract::State, Json};
use prover_registry_common::types::{Network, Prover};

/// GET /validProvers - メインネットの有効プロバー
pub async fn valid_provers(State(state): State<AppState>) -> Json<Vec<Prover>> {
    Json(state.provers.valid_provers(Network::Mainnet).await)
}

/// GET /validTestnetProvers - テストネットの有効プロバー
pub async fn valid_testnet_provers(State(state): State<AppState>) -> Json<Vec<Prover>> {
    Json(state.provers.valid_provers(Network::Testnet).await)
}
