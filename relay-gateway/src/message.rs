//! A relay request body, read and checked against its declared length.

use std::borrow::Cow;

use axum::body::Bytes;
use axum::http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
use uuid::Uuid;

use crate::error::GatewayError;

/// Raw payload received on a relay route.
///
/// Immutable once read; lives for the duration of one request.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct InboundMessage {
    /// Correlates every log line of this request.
    pub request_id: Uuid,
    /// Path the payload arrived on.
    pub path: String,
    /// Length declared by the client.
    pub content_length: usize,
    /// Exactly `content_length` bytes of body.
    pub payload: Bytes,
}

impl InboundMessage {
    /// Validate the declared length and take that many bytes of `body`.
    ///
    /// # Errors
    /// Returns [`GatewayError::MalformedRequest`] if the content length is
    /// absent, not a number, or larger than the body received.
    pub fn read(path: &str, headers: &HeaderMap, mut body: Bytes) -> Result<Self, GatewayError> {
        let content_length = parse_content_length(headers.get(CONTENT_LENGTH))?;
        if body.len() < content_length {
            return Err(GatewayError::MalformedRequest(format!(
                "declared content length {content_length} but received {} bytes",
                body.len()
            )));
        }
        body.truncate(content_length);
        Ok(Self {
            request_id: Uuid::new_v4(),
            path: path.to_owned(),
            content_length,
            payload: body,
        })
    }

    /// The payload as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

/// Parse a `Content-Length` header value.
///
/// # Errors
/// Returns [`GatewayError::MalformedRequest`] if the header is absent or is
/// not a plain decimal number.
pub fn parse_content_length(value: Option<&HeaderValue>) -> Result<usize, GatewayError> {
    let Some(value) = value else {
        return Err(GatewayError::MalformedRequest("missing content-length".to_owned()));
    };
    let text = value
        .to_str()
        .map_err(|_| GatewayError::MalformedRequest("content-length is not text".to_owned()))?
        .trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatewayError::MalformedRequest(format!(
            "content-length '{text}' is not a number"
        )));
    }
    text.parse::<usize>()
        .map_err(|e| GatewayError::MalformedRequest(format!("content-length '{text}': {e}")))
}
