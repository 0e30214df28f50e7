use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use kubegraph_k8s::ClusterError;

/// Errors surfaced to HTTP clients as `{"error": message}`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unusable request input; no cluster call was made
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The cluster API call failed
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ClusterError> for ApiError {
    fn from(err: ClusterError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::Upstream(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Upstream(message) => error!(%status, error = %message, "Request failed"),
            Self::BadRequest(message) | Self::NotFound(message) => {
                warn!(%status, error = %message, "Request rejected")
            }
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
