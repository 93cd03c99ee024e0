//! Axum route handlers for the relay.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use relay_client::ForwardingProxy;
use relay_core::ForwardResult;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::GatewayError, message::InboundMessage, model_data, options::ServerOptions,
    sink::ResultsSink,
};

/// Optimization results arrive here.
pub const RESULTS_PATH: &str = "/from_hertta/optimization_results";

/// The optimizer fetches model data here.
pub const MODEL_DATA_PATH: &str = "/to_hertta/model_data";

/// Liveness probe.
pub const HEALTH_PATH: &str = "/health";

// ── Shared state ─────────────────────────────────────────────────────────────

/// Everything a handler may touch. Cloned per request; all of it is
/// read-only.
#[derive(Clone)]
pub struct AppState {
    pub options: Arc<ServerOptions>,
    pub proxy: ForwardingProxy,
    pub sink: Arc<dyn ResultsSink>,
}

impl AppState {
    /// Build the state for `options`, forwarding with the configured timeout.
    #[must_use]
    pub fn new(options: Arc<ServerOptions>, sink: Arc<dyn ResultsSink>) -> Self {
        let proxy = ForwardingProxy::new(options.client_config());
        Self { options, proxy, sink }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router.
///
/// One relay route is registered per entry of
/// [`ServerOptions::forward_routes`]. A known path requested with the wrong
/// method answers 404, like an unknown path. Request bodies are bounded by
/// [`ServerOptions::max_body_bytes`], unbounded when it is unset.
pub fn create_router(state: AppState) -> Router {
    let body_limit = match state.options.max_body_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    let mut router = Router::new()
        .route(RESULTS_PATH, post(optimization_results).fallback(not_found))
        .route(MODEL_DATA_PATH, get(model_data).fallback(not_found))
        .route(HEALTH_PATH, get(health).fallback(not_found));

    for (path, target) in &state.options.forward_routes {
        let route_path: Arc<str> = Arc::from(path.as_str());
        let target: Arc<str> = Arc::from(target.as_str());
        let handler = move |State(state): State<AppState>, headers: HeaderMap, body: Bytes| {
            relay(state, Arc::clone(&route_path), Arc::clone(&target), headers, body)
        };
        router = router.route(path, post(handler).fallback(not_found));
    }

    router
        .fallback(not_found)
        .layer(body_limit)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `POST <relay path>`: Forward the body verbatim, then answer once.
///
/// The only reply is sent after the downstream outcome is known: 200 when
/// the downstream service answered 200, 500 otherwise.
///
/// # Errors
/// Returns [`GatewayError::MalformedRequest`] for a bad content length and
/// [`GatewayError::ForwardingFailure`] when forwarding fails.
async fn relay(
    state: AppState,
    path: Arc<str>,
    target: Arc<str>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let message = InboundMessage::read(&path, &headers, body)?;
    tracing::info!(
        request_id = %message.request_id,
        %path,
        bytes = message.content_length,
        payload = %message.text(),
        "relay received payload"
    );

    let mut forward_headers = HeaderMap::new();
    forward_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    match state.proxy.forward(&target, &forward_headers, message.payload.clone()).await {
        ForwardResult::Forwarded(_) => Ok((
            StatusCode::OK,
            [(CONTENT_TYPE, "text/plain")],
            format!("Received and forwarded POST data from {path}: {}", message.text()),
        )
            .into_response()),
        ForwardResult::Failed(failure) => {
            tracing::warn!(
                request_id = %message.request_id,
                %path,
                %target,
                %failure,
                "relay could not forward payload"
            );
            Err(GatewayError::ForwardingFailure { path: path.to_string(), failure })
        }
    }
}

/// `POST /from_hertta/optimization_results`: Hand the body to the sink.
///
/// # Errors
/// Returns [`GatewayError::SinkFailure`] if the sink cannot store the body.
async fn optimization_results(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, GatewayError> {
    state.sink.accept(body).await?;
    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain")],
        "Optimization results received and processed",
    ))
}

/// `GET /to_hertta/model_data`: Serve the YAML model-data resource.
///
/// # Errors
/// Returns [`GatewayError::ResourceNotFound`] if the file is absent and
/// [`GatewayError::ModelData`] if it cannot be read or parsed.
async fn model_data(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let document = model_data::load(&state.options.model_data_path).await?;
    Ok((StatusCode::OK, [(CONTENT_TYPE, "application/x-yaml")], document))
}

/// `GET /health`: Liveness probe.
async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

async fn not_found(method: Method, uri: Uri) -> GatewayError {
    tracing::debug!(%method, %uri, "no route");
    GatewayError::RouteNotFound { method: method.to_string(), path: uri.path().to_owned() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use crate::sink::LogSink;

    fn test_state(options: ServerOptions) -> AppState {
        AppState::new(Arc::new(options), Arc::new(LogSink))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
        let resp = match app.oneshot(req).await {
            Ok(r) => r,
            Err(e) => panic!("handler error: {e}"),
        };
        let status = resp.status();
        let bytes = match axum::body::to_bytes(resp.into_body(), 64 * 1024).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn request(method: Method, uri: &str, body: Body) -> Request<Body> {
        match Request::builder().method(method).uri(uri).body(body) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        }
    }

    #[tokio::test]
    async fn health_response_format_returns_ok_with_status_field() {
        let app = create_router(test_state(ServerOptions::default()));
        let (status, body) = send(app, request(Method::GET, "/health", Body::empty())).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        };
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_path_returns_404_not_found() {
        let app = create_router(test_state(ServerOptions::default()));
        let (status, body) = send(app, request(Method::POST, "/nope", Body::empty())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not Found");
    }

    #[tokio::test]
    async fn wrong_method_on_known_path_returns_404() {
        let app = create_router(test_state(ServerOptions::default()));
        let (status, _) = send(app.clone(), request(Method::GET, "/from_hass/post", Body::empty())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(app, request(Method::POST, MODEL_DATA_PATH, Body::empty())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn paths_are_case_sensitive_and_not_slash_normalized() {
        let app = create_router(test_state(ServerOptions::default()));
        let (status, _) = send(app.clone(), request(Method::GET, "/To_Hertta/model_data", Body::empty())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(app, request(Method::GET, "/to_hertta/model_data/", Body::empty())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn relay_without_content_length_is_400_and_forwards_nothing() {
        let mut options = ServerOptions::default();
        // Unroutable target: reaching it would show up as 500, not 400.
        options.forward_routes.insert("/from_hass/post".to_owned(), "http://127.0.0.1:1/x".to_owned());
        let app = create_router(test_state(options));
        let (status, _) = send(app, request(Method::POST, "/from_hass/post", Body::from("hello"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn relay_with_non_numeric_content_length_is_400() {
        let app = create_router(test_state(ServerOptions::default()));
        let req = match Request::builder()
            .method(Method::POST)
            .uri("/to_hass/post")
            .header("content-length", "five")
            .body(Body::from("hello"))
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn model_data_absent_returns_404() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let mut options = ServerOptions::default();
        options.model_data_path = dir.path().join("model_data.yaml");
        let app = create_router(test_state(options));

        let (status, body) = send(app, request(Method::GET, MODEL_DATA_PATH, Body::empty())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Model data not found");
        assert!(!dir.path().join("model_data.yaml").exists(), "lookup must not create the file");
    }

    #[tokio::test]
    async fn model_data_present_returns_yaml() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let path = dir.path().join("model_data.yaml");
        if let Err(e) = std::fs::write(&path, "temporals:\n  t: [1, 2, 3]\n") {
            panic!("write: {e}");
        }
        let mut options = ServerOptions::default();
        options.model_data_path = path;
        let app = create_router(test_state(options));

        let resp = match app.oneshot(request(Method::GET, MODEL_DATA_PATH, Body::empty())).await {
            Ok(r) => r,
            Err(e) => panic!("handler error: {e}"),
        };
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(CONTENT_TYPE).map(HeaderValue::as_bytes),
            Some(&b"application/x-yaml"[..])
        );
    }

    #[tokio::test]
    async fn model_data_unparsable_returns_500_with_error_text() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let path = dir.path().join("model_data.yaml");
        if let Err(e) = std::fs::write(&path, "a: [1, 2\n") {
            panic!("write: {e}");
        }
        let mut options = ServerOptions::default();
        options.model_data_path = path;
        let app = create_router(test_state(options));

        let (status, body) = send(app, request(Method::GET, MODEL_DATA_PATH, Body::empty())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.is_empty(), "error text must be returned");
    }

    #[tokio::test]
    async fn optimization_results_returns_200() {
        let app = create_router(test_state(ServerOptions::default()));
        let (status, body) = send(app, request(Method::POST, RESULTS_PATH, Body::from("{\"x\":1}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Optimization results received and processed");
    }
}
