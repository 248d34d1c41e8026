use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorResponse;
use crate::storage::StorageError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    StorageError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", Some(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ApiError::StorageError(err) => {
                tracing::error!("storage failure: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage Error",
                    Some(err.to_string()),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

// Convenience conversion so handlers can use `?` on provider calls. Name
// validation failures are the caller's fault, so they surface as 400
// instead of 500.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(StorageError::InvalidName(_)) = err.downcast_ref::<StorageError>() {
            return ApiError::BadRequest(err.to_string());
        }
        ApiError::StorageError(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let error = ApiError::NotFound("application 'svc' not found".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(error_response.error, "Not Found");
        assert_eq!(
            error_response.details,
            Some("application 'svc' not found".to_string())
        );
    }

    #[tokio::test]
    async fn storage_error_maps_to_500() {
        let error = ApiError::StorageError(anyhow::anyhow!("disk on fire"));
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(error_response.error, "Storage Error");
        assert_eq!(error_response.details, Some("disk on fire".to_string()));
    }

    #[test]
    fn from_anyhow_error() {
        let err: ApiError = anyhow::anyhow!("some error").into();
        assert!(matches!(err, ApiError::StorageError(_)));
    }

    #[tokio::test]
    async fn invalid_name_maps_to_400() {
        let source: anyhow::Error = StorageError::InvalidName("a/b".to_string()).into();
        let response = ApiError::from(source).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(error_response.error, "Bad Request");
    }
}
