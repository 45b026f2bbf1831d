use thiserror::Error;

/// Request-level failures. Per-claim failures are reported inside the response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("node agent is shutting down")]
    ShuttingDown,

    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "grpc")]
impl From<ApiError> for tonic::Status {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::InvalidRequest(msg) => tonic::Status::invalid_argument(msg),
            ApiError::NotFound(msg) => tonic::Status::not_found(msg),
            ApiError::ShuttingDown => tonic::Status::unavailable(e.to_string()),
            ApiError::Internal(msg) => tonic::Status::internal(msg),
        }
    }
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}


#[cfg(all(test, feature = "http"))]
mod http_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(
            ApiError::InvalidRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ShuttingDown.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
