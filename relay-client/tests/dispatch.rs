//! Integration tests: entity control against a live hub stub.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::StatusCode;
use relay_client::{
    ClientConfig, CommandSequencer, Dispatcher, HttpDispatcher, SequencerConfig,
};
use relay_core::DispatchOutcome;

use common::{closed_addr, spawn_stub};

#[tokio::test]
async fn dispatch_sends_authenticated_json_and_is_accepted_on_200() {
    let hub = spawn_stub(StatusCode::OK).await;
    let dispatcher = HttpDispatcher::default();

    let outcome = dispatcher
        .dispatch(&hub.url("/api/control"), "climate.lounge", Some("Bearer abc"), 21.5)
        .await;

    assert_eq!(outcome, DispatchOutcome::Accepted);
    let received = hub.received();
    assert_eq!(received.len(), 1);
    let request = &received[0];
    assert_eq!(
        request.headers.get(AUTHORIZATION).map(|v| v.as_bytes()),
        Some(&b"Bearer abc"[..]),
        "Authorization must carry the token verbatim"
    );
    assert_eq!(
        request.headers.get(CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"application/json"[..])
    );
    let payload: serde_json::Value = match serde_json::from_slice(&request.body) {
        Ok(v) => v,
        Err(e) => panic!("hub received invalid JSON: {e}"),
    };
    assert_eq!(payload, serde_json::json!({"entity_id": "climate.lounge", "value": 21.5}));
}

#[tokio::test]
async fn dispatch_is_rejected_with_hub_status() {
    for status in [StatusCode::UNAUTHORIZED, StatusCode::INTERNAL_SERVER_ERROR] {
        let hub = spawn_stub(status).await;
        let outcome = HttpDispatcher::default()
            .dispatch(&hub.url("/api/control"), "climate.lounge", Some("abc"), 20.0)
            .await;
        assert_eq!(outcome, DispatchOutcome::Rejected { status: Some(status.as_u16()) });
    }
}

#[tokio::test]
async fn dispatch_with_invalid_token_never_reaches_the_network() {
    let hub = spawn_stub(StatusCode::OK).await;
    let dispatcher = HttpDispatcher::default();

    for token in [None, Some(""), Some("\u{7FFF}")] {
        let outcome = dispatcher.dispatch(&hub.url("/api/control"), "climate.lounge", token, 20.0).await;
        assert_eq!(outcome, DispatchOutcome::Rejected { status: None }, "token {token:?}");
    }
    assert!(hub.received().is_empty(), "no request may be sent for an invalid token");
}

#[tokio::test]
async fn dispatch_to_closed_socket_is_transport_error() {
    let addr = closed_addr().await;
    let outcome = HttpDispatcher::new(ClientConfig::new(Duration::from_secs(2)))
        .dispatch(&format!("http://{addr}/api/control"), "climate.lounge", Some("abc"), 20.0)
        .await;
    assert!(
        matches!(outcome, DispatchOutcome::TransportError(_)),
        "expected transport error, got {outcome:?}"
    );
}

#[tokio::test]
async fn sequencer_over_http_sends_two_of_three_values() {
    let hub = spawn_stub(StatusCode::OK).await;
    let sequencer = CommandSequencer::new(
        Arc::new(HttpDispatcher::default()),
        SequencerConfig::new(2, Duration::from_millis(50)),
    );

    let report = sequencer
        .run(&hub.url("/api/control"), "climate.lounge", Some("abc"), &[10.0, 20.0, 30.0])
        .await;

    assert!(report.completed());
    assert_eq!(report.accepted_count(), 2);
    let values: Vec<serde_json::Value> = hub
        .received()
        .iter()
        .map(|r| match serde_json::from_slice::<serde_json::Value>(&r.body) {
            Ok(v) => v["value"].clone(),
            Err(e) => panic!("invalid JSON: {e}"),
        })
        .collect();
    assert_eq!(values, vec![serde_json::json!(10.0), serde_json::json!(20.0)]);
}
