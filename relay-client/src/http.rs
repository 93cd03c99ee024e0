//! Minimal HTTP/1 POST client over TCP.
//!
//! Every call opens its own connection and owns it for the duration of the
//! exchange. The peers are local services on plain HTTP, so there is no TLS
//! and no pooling.

use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, HOST};
use hyper::{Method, Request, Uri};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::ClientError;

/// Status and body of a downstream reply.
#[derive(Debug, Clone)]
pub(crate) struct HttpReply {
    pub status: u16,
    pub body: Bytes,
}

/// Send one POST to `url`, bounded by `timeout` end to end.
///
/// Non-2xx replies are not errors here; classification belongs to the
/// caller.
///
/// # Errors
/// Returns [`ClientError`] on a bad URL, connection or protocol failure, or
/// when `timeout` expires.
pub(crate) async fn post(
    url: &str,
    headers: &HeaderMap,
    body: Bytes,
    timeout: Duration,
) -> Result<HttpReply, ClientError> {
    let uri: Uri = url.parse().map_err(|e| ClientError::InvalidUrl {
        url: url.to_owned(),
        reason: format!("{e}"),
    })?;

    match uri.scheme_str() {
        Some("http") => {}
        Some(other) => {
            return Err(ClientError::UnsupportedScheme {
                url: url.to_owned(),
                scheme: other.to_owned(),
            })
        }
        None => {
            return Err(ClientError::InvalidUrl {
                url: url.to_owned(),
                reason: "missing scheme".to_owned(),
            })
        }
    }

    tokio::time::timeout(timeout, exchange(&uri, headers, body))
        .await
        .map_err(|_| ClientError::Timeout(timeout))?
}

async fn exchange(uri: &Uri, headers: &HeaderMap, body: Bytes) -> Result<HttpReply, ClientError> {
    let (Some(host), Some(authority)) = (uri.host(), uri.authority()) else {
        return Err(ClientError::InvalidUrl {
            url: uri.to_string(),
            reason: "missing host".to_owned(),
        });
    };
    let addr = format!("{host}:{}", uri.port_u16().unwrap_or(80));

    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| ClientError::Connect { addr: addr.clone(), source })?;

    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| ClientError::Handshake(e.to_string()))?;

    // Drive the connection in the background.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("downstream connection closed: {e}");
        }
    });

    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let content_len = body.len();

    let mut req = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(HOST, authority.as_str())
        .body(Full::new(body))
        .map_err(|e| ClientError::Request(format!("build request: {e}")))?;

    req.headers_mut().extend(headers.clone());
    req.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(content_len));

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| ClientError::Request(format!("send request: {e}")))?;

    let status = resp.status().as_u16();
    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| ClientError::Body(e.to_string()))?
        .to_bytes();

    Ok(HttpReply { status, body })
}
