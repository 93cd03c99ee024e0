//! Error types for the client crate.

use std::time::Duration;

/// Errors raised by a single outbound HTTP exchange.
///
/// These never escape the crate's public operations: the proxy and the
/// dispatcher fold them into their outcome types.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The target URL could not be parsed or has no host.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Only plain `http://` peers are supported.
    #[error("unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    /// TCP connect failed.
    #[error("connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP/1 handshake failed.
    #[error("HTTP handshake: {0}")]
    Handshake(String),

    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("read response body: {0}")]
    Body(String),

    /// The exchange did not finish within the configured bound.
    #[error("no response within {0:?}")]
    Timeout(Duration),
}
