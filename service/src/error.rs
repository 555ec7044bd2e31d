//! HTTP error mapping for capability failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Service-level error, wrapping the session layer's taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Capability(#[from] writekit_session::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        use writekit_session::Error as Capability;

        let Error::Capability(inner) = &self;
        let (status, error_type) = match inner {
            Capability::NotSupported(_) => (StatusCode::NOT_IMPLEMENTED, "capability_not_supported"),
            Capability::Unavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "capability_unavailable")
            }
            Capability::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            Capability::Provisioning(_) => (StatusCode::BAD_GATEWAY, "provisioning_failed"),
            Capability::Invocation(_) => (StatusCode::BAD_GATEWAY, "invocation_failed"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
