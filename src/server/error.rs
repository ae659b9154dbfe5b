//! Handler error type.
//!
//! Every handler returns `Result<T, ServerError>`; the [`IntoResponse`] impl
//! turns it into a JSON `{"error": ...}` body with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::recommender::RecommendError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The requested song is not in the catalogue.
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Recommender(#[from] RecommendError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Recommender(e) => {
                error!(error = %e, "recommender error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = ServerError::NotFound("Song not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn backend_errors_map_to_500() {
        let response = ServerError::from(RecommendError::Io {
            path: "songs.json".into(),
            source: std::io::Error::other("boom"),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
