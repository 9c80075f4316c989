use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ApiResponse;

/// Pipeline-level failures. Each variant is a distinct, inspectable kind —
/// the HTTP boundary owns the translation into status codes and wire codes.
/// Field-level absence (a page without a description) is data, never an error.
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("invalid url: {0}")]
    Validation(String),

    #[error("could not fetch the url: {0}")]
    Fetch(String),

    #[error("could not decode the fetched document: {0}")]
    Parse(String),

    #[error("rendering service failed: {0}")]
    Render(String),

    #[error("request timed out while extracting metadata")]
    Timeout,

    /// The pipeline ran to completion but no source yielded a usable title.
    /// Not a hard failure — the boundary maps it to 422 rather than 5xx.
    #[error("could not extract metadata from the url")]
    Incomplete,
}

/// Boundary-level errors with their wire representation.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("url parameter is required")]
    MissingUrl,

    #[error("invalid url format")]
    InvalidUrl,

    #[error(transparent)]
    Preview(#[from] PreviewError),
}

impl AppError {
    /// Stable machine-readable code included in the error envelope.
    fn code(&self) -> &'static str {
        match self {
            AppError::MissingUrl => "MISSING_URL",
            AppError::InvalidUrl | AppError::Preview(PreviewError::Validation(_)) => "INVALID_URL",
            AppError::Preview(PreviewError::Incomplete) => "NO_METADATA",
            AppError::Preview(PreviewError::Timeout) => "TIMEOUT",
            AppError::Preview(PreviewError::Fetch(_)) => "FETCH_ERROR",
            AppError::Preview(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MissingUrl | AppError::InvalidUrl => StatusCode::BAD_REQUEST,
            AppError::Preview(PreviewError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Preview(PreviewError::Incomplete) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Preview(PreviewError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Preview(PreviewError::Fetch(_)) => StatusCode::BAD_GATEWAY,
            AppError::Preview(e) => {
                tracing::error!(error = %e, "Metadata extraction failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            AppError::Preview(PreviewError::Timeout) => {
                "request timeout while extracting metadata".to_string()
            }
            AppError::Preview(PreviewError::Fetch(_)) => "could not fetch the URL".to_string(),
            AppError::Preview(PreviewError::Render(_) | PreviewError::Parse(_)) => {
                "failed to extract metadata".to_string()
            }
            other => other.to_string(),
        };

        let code = self.code();
        (status, Json(ApiResponse::failure(message, code))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_url_returns_400() {
        let response = AppError::MissingUrl.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "MISSING_URL");
    }

    #[tokio::test]
    async fn invalid_url_returns_400() {
        let response = AppError::InvalidUrl.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["code"], "INVALID_URL");
    }

    #[tokio::test]
    async fn incomplete_returns_422_no_metadata() {
        let response = AppError::from(PreviewError::Incomplete).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["code"], "NO_METADATA");
    }

    #[tokio::test]
    async fn timeout_returns_504() {
        let response = AppError::from(PreviewError::Timeout).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["code"], "TIMEOUT");
        assert_eq!(json["error"], "request timeout while extracting metadata");
    }

    #[tokio::test]
    async fn fetch_error_returns_502() {
        let response =
            AppError::from(PreviewError::Fetch("connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["code"], "FETCH_ERROR");
        assert_eq!(json["error"], "could not fetch the URL");
    }

    #[tokio::test]
    async fn render_error_returns_500() {
        let response = AppError::from(PreviewError::Render("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response.into_body()).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INTERNAL_ERROR");
    }
}
