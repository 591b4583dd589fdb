//! テスト用のRouter・モックプロバーヘルパー

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use prover_registry::{
    api,
    cache::MemoryCacheStore,
    db::{endpoints::SqliteEndpointRepository, run_migrations},
    probe::HttpProber,
    provers::ProverService,
    shutdown::ShutdownController,
    AppState,
};
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;
use wiremock::{
    matchers::{header as header_matcher, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// テスト用のサーバー一式
pub struct TestRegistry {
    pub router: Router,
    pub cache: Arc<MemoryCacheStore>,
    pub pool: SqlitePool,
    pub public_dir: tempfile::TempDir,
}

/// テスト用のSQLiteデータベースプールを作成する
///
/// `sqlite::memory:` は接続ごとに別DBになるため接続数を1に固定する。
pub async fn create_test_db_pool() -> SqlitePool {
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

/// インメモリのDB・キャッシュでRouterを作成する（.oneshot()スタイルのテスト用）
pub async fn create_test_registry() -> TestRegistry {
    let pool = create_test_db_pool().await;
    let cache = Arc::new(MemoryCacheStore::new());
    let records = Arc::new(SqliteEndpointRepository::new(pool.clone()));
    let prober = Arc::new(HttpProber::new().expect("Failed to build prober"));
    let provers = ProverService::new(cache.clone(), records, prober);

    let public_dir = tempfile::tempdir().expect("Failed to create public dir");
    let state = AppState {
        provers,
        public_dir: public_dir.path().to_path_buf(),
        shutdown: ShutdownController::default(),
    };

    TestRegistry {
        router: api::create_router(state),
        cache,
        pool,
        public_dir,
    }
}

impl TestRegistry {
    /// GETしてステータスとJSONボディを返す
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        send(self.router.clone(), request).await
    }

    /// レコード作成をPOSTする
    pub async fn create_record(&self, collection: &str, url: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/collections/{}/records", collection))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "url": url }).to_string()))
            .unwrap();
        send(self.router.clone(), request).await
    }

    /// 登録済みレコード数
    pub async fn record_count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap();
        count
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body).into_owned())
        })
    };
    (status, value)
}

/// `GET /status`に指定のボディで応答するモックプロバーを起動する
pub async fn start_mock_prover(status_body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .and(header_matcher("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body))
        .mount(&server)
        .await;
    server
}
