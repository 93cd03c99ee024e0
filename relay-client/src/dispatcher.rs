//! Authenticated entity-control requests to the hub.

use std::sync::Arc;

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use relay_core::{ControlCommand, DispatchOutcome};

use crate::config::ClientConfig;
use crate::http;

/// Sends one control value for one entity.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
/// Every outcome is returned as a value; nothing here aborts the caller.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Set `entity_id` to `value` at the hub endpoint `url`.
    ///
    /// A token that fails the credential gate yields
    /// `Rejected { status: None }` without any network traffic.
    async fn dispatch(
        &self,
        url: &str,
        entity_id: &str,
        token: Option<&str>,
        value: f64,
    ) -> DispatchOutcome;
}

#[async_trait]
impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    async fn dispatch(
        &self,
        url: &str,
        entity_id: &str,
        token: Option<&str>,
        value: f64,
    ) -> DispatchOutcome {
        (**self).dispatch(url, entity_id, token, value).await
    }
}

/// [`Dispatcher`] that POSTs `{"entity_id", "value"}` JSON to the hub.
#[derive(Debug, Clone, Default)]
pub struct HttpDispatcher {
    config: ClientConfig,
}

impl HttpDispatcher {
    /// Create a dispatcher with the given client settings.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    async fn send(&self, url: &str, command: &ControlCommand) -> DispatchOutcome {
        let body = match serde_json::to_vec(&command.payload()) {
            Ok(b) => Bytes::from(b),
            Err(e) => return DispatchOutcome::TransportError(format!("encode payload: {e}")),
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match HeaderValue::from_str(command.token.as_str()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => return DispatchOutcome::Rejected { status: None },
        }

        match http::post(url, &headers, body, self.config.request_timeout).await {
            Ok(reply) => DispatchOutcome::from_status(reply.status),
            Err(e) => DispatchOutcome::TransportError(e.to_string()),
        }
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        url: &str,
        entity_id: &str,
        token: Option<&str>,
        value: f64,
    ) -> DispatchOutcome {
        let command = match ControlCommand::new(entity_id, value, token) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(%entity_id, value, error = %e, "control command refused locally");
                return DispatchOutcome::Rejected { status: None };
            }
        };

        let outcome = self.send(url, &command).await;
        match &outcome {
            DispatchOutcome::Accepted => {
                tracing::info!(%url, %entity_id, value, "control value accepted");
            }
            other => {
                tracing::warn!(%url, %entity_id, value, outcome = %other, "control value not accepted");
            }
        }
        outcome
    }
}
