//! REST APIハンドラー
//!
//! 有効プロバー一覧、レコード登録、ヘルスチェック、静的ファイル配信

/// エラーレスポンス
pub mod error;
/// 有効プロバー一覧
pub mod provers;
/// レコード登録・一覧
pub mod records;

use crate::AppState;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// APIルーターを作成
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.public_dir);

    Router::new()
        .route("/validProvers", get(provers::valid_provers))
        .route("/validTestnetProvers", get(provers::valid_testnet_provers))
        .route(
            "/api/collections/:collection/records",
            get(records::list_records).post(records::create_record),
        )
        .route("/health", get(health))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health - 死活確認
async fn health() -> &'static str {
    "ok"
}
