//! Shared downstream stub for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct Received {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A local HTTP server answering every POST with a fixed status.
pub struct Stub {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Received>>>,
}

impl Stub {
    /// URL of `path` on this stub.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Requests received so far.
    pub fn received(&self) -> Vec<Received> {
        match self.received.lock() {
            Ok(r) => r.clone(),
            Err(e) => panic!("stub lock poisoned: {e}"),
        }
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    delay: Duration,
    received: Arc<Mutex<Vec<Received>>>,
}

async fn record(
    State(state): State<StubState>,
    uri: axum::http::Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    match state.received.lock() {
        Ok(mut r) => r.push(Received { path: uri.path().to_owned(), headers, body }),
        Err(e) => panic!("stub lock poisoned: {e}"),
    }
    tokio::time::sleep(state.delay).await;
    state.status
}

/// Start a stub that answers with `status` immediately.
pub async fn spawn_stub(status: StatusCode) -> Stub {
    spawn_slow_stub(status, Duration::ZERO).await
}

/// Start a stub that waits `delay` before answering with `status`.
pub async fn spawn_slow_stub(status: StatusCode, delay: Duration) -> Stub {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = StubState { status, delay, received: Arc::clone(&received) };
    let app = Router::new().route("/{*path}", post(record)).with_state(state);

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(l) => l,
        Err(e) => panic!("failed to bind stub: {e}"),
    };
    let addr = match listener.local_addr() {
        Ok(a) => a,
        Err(e) => panic!("stub has no local addr: {e}"),
    };
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            panic!("stub server error: {e}");
        }
    });

    Stub { addr, received }
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(l) => l,
        Err(e) => panic!("failed to bind: {e}"),
    };
    match listener.local_addr() {
        Ok(a) => a,
        Err(e) => panic!("no local addr: {e}"),
    }
}
