//! Verbatim re-submission of a received payload to a downstream service.

use hyper::body::Bytes;
use hyper::header::HeaderMap;
use relay_core::{ForwardFailure, ForwardResult};

use crate::config::ClientConfig;
use crate::http;

/// Re-POSTs payloads to a downstream URL and classifies the reply.
///
/// The proxy never retries: one call, one outbound request. A retry
/// policy, if any, belongs to the caller.
#[derive(Debug, Clone, Default)]
pub struct ForwardingProxy {
    config: ClientConfig,
}

impl ForwardingProxy {
    /// Create a proxy with the given client settings.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Send `body` with `headers` to `url`.
    ///
    /// HTTP 200 yields [`ForwardResult::Forwarded`]; any other status yields
    /// [`ForwardFailure::Status`]; transport faults, including timeout,
    /// yield [`ForwardFailure::Transport`]. Never returns an error.
    pub async fn forward(&self, url: &str, headers: &HeaderMap, body: Bytes) -> ForwardResult {
        match http::post(url, headers, body, self.config.request_timeout).await {
            Ok(reply) => {
                let result = ForwardResult::from_status(reply.status);
                if result.is_forwarded() {
                    tracing::info!(%url, status = reply.status, "payload forwarded");
                } else {
                    tracing::warn!(
                        %url,
                        status = reply.status,
                        body = %String::from_utf8_lossy(&reply.body),
                        "downstream refused payload"
                    );
                }
                result
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "forwarding failed");
                ForwardResult::Failed(ForwardFailure::Transport(e.to_string()))
            }
        }
    }
}
