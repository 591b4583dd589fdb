//! レコード登録APIハンドラー
//!
//! コレクション名は`prover_endpoints` / `testnet_prover_endpoints`
//! （`mainnet` / `testnet`も可）。

use super::error::AppError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use prover_registry_common::{
    error::RegistryError,
    protocol::{CreateRecordRequest, RecordListResponse},
    types::{EndpointRecord, Network},
};

fn parse_collection(collection: &str) -> Result<Network, AppError> {
    collection
        .parse::<Network>()
        .map_err(|_| AppError(RegistryError::UnknownCollection(collection.to_string())))
}

/// POST /api/collections/:collection/records - エンドポイント登録
///
/// 作成前フックでプローブに成功した場合のみレコードを作成する。
pub async fn create_record(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<EndpointRecord>), AppError> {
    let network = parse_collection(&collection)?;
    let record = state.provers.register(network, &req.url).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/collections/:collection/records - 登録済みレコード一覧
pub async fn list_records(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Json<RecordListResponse>, AppError> {
    let network = parse_collection(&collection)?;
    let records = state.provers.list_records(network).await?;
    Ok(Json(records.into()))
}
