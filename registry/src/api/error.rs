//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use axum::{http::StatusCode, response::IntoResponse, Json};
use prover_registry_common::error::{RegistryError, ValidationError};
use serde_json::json;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(
    /// 元のエラー
    pub RegistryError,
);

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        AppError(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError(RegistryError::Validation(err))
    }
}

impl AppError {
    /// HTTPステータスコード
    ///
    /// 登録時のキャッシュ書き込み失敗は500。
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            RegistryError::Validation(ValidationError::Cache { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
            RegistryError::Conflict(_) => StatusCode::CONFLICT,
            RegistryError::UnknownCollection(_) => StatusCode::NOT_FOUND,
            RegistryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::warn!(error = %self.0, "Request rejected");
        }

        let payload = json!({
            "error": self.0.external_message()
        });

        (status, Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use prover_registry_common::error::{CacheError, ProbeError};
    use serde_json::Value;

    async fn render(err: RegistryError) -> (StatusCode, Value) {
        let response = AppError(err).into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_disqualified_is_bad_request_naming_url() {
        let (status, body) = render(RegistryError::Validation(ValidationError::Disqualified {
            url: "http://prover.example".to_string(),
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("http://prover.example"));
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let (status, body) =
            render(RegistryError::Database("disk I/O error at /var/lib".to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database error");
    }

    #[tokio::test]
    async fn test_conflict() {
        let (status, _) = render(RegistryError::Conflict("dup".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_status_code_mapping() {
        let unreachable = AppError::from(ValidationError::Unreachable {
            url: "http://prover.invalid".to_string(),
            source: ProbeError::Status("503 Service Unavailable".to_string()),
        });
        assert_eq!(unreachable.status_code(), StatusCode::BAD_REQUEST);

        let cache_failure = AppError::from(ValidationError::Cache {
            url: "http://a".to_string(),
            source: CacheError::Write("connection refused".to_string()),
        });
        assert_eq!(cache_failure.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let unknown = AppError(RegistryError::UnknownCollection("users".to_string()));
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
    }
}
