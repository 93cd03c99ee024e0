//! Error types for the gateway crate.

use std::path::PathBuf;

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use relay_core::ForwardFailure;

/// Errors that can occur while handling a relay request or starting up.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The content length is missing, not a number, or larger than the body.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The downstream service did not accept the relayed payload.
    #[error("forwarding from {path} failed: {failure}")]
    ForwardingFailure { path: String, failure: ForwardFailure },

    /// The model-data resource does not exist.
    #[error("model data not found at {}", .0.display())]
    ResourceNotFound(PathBuf),

    /// The model-data resource exists but could not be read or parsed.
    #[error("{0}")]
    ModelData(String),

    /// The optimization-results sink refused the payload.
    #[error("results sink failed: {0}")]
    SinkFailure(String),

    /// No route matches the method and path.
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// The options file exists but is unusable.
    #[error("invalid options file {}: {reason}", .path.display())]
    Options { path: PathBuf, reason: String },
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::ResourceNotFound(_) | GatewayError::RouteNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            GatewayError::ForwardingFailure { .. }
            | GatewayError::ModelData(_)
            | GatewayError::SinkFailure(_)
            | GatewayError::Options { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body text sent to the client. Peers match on the fixed strings.
    fn body(&self) -> String {
        match self {
            GatewayError::ForwardingFailure { .. } => "Failed to forward the message".to_owned(),
            GatewayError::ResourceNotFound(_) => "Model data not found".to_owned(),
            GatewayError::RouteNotFound { .. } => "Not Found".to_owned(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), [(CONTENT_TYPE, "text/plain")], self.body()).into_response()
    }
}
