//! Destinations for optimization results.

use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::io::AsyncWriteExt;

use crate::error::GatewayError;

/// Receives optimization result payloads exactly as they arrived.
///
/// Implementations must be `Send + Sync` to allow use across request
/// handlers.
#[async_trait]
pub trait ResultsSink: Send + Sync {
    /// Take ownership of one payload.
    ///
    /// # Errors
    /// Returns [`GatewayError::SinkFailure`] if the payload could not be stored.
    async fn accept(&self, payload: Bytes) -> Result<(), GatewayError>;
}

/// Logs each payload and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl ResultsSink for LogSink {
    async fn accept(&self, payload: Bytes) -> Result<(), GatewayError> {
        tracing::info!(
            bytes = payload.len(),
            results = %String::from_utf8_lossy(&payload),
            "received optimization results"
        );
        Ok(())
    }
}

/// Appends each payload to a file, one payload per line.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink writing to `path`. The file is created on first use.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ResultsSink for FileSink {
    async fn accept(&self, payload: Bytes) -> Result<(), GatewayError> {
        let sink_err = |e: std::io::Error| {
            GatewayError::SinkFailure(format!("{}: {e}", self.path.display()))
        };

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(sink_err)?;

        let mut line = Vec::with_capacity(payload.len() + 1);
        line.extend_from_slice(&payload);
        line.push(b'\n');
        file.write_all(&line).await.map_err(sink_err)?;
        file.flush().await.map_err(sink_err)?;

        tracing::info!(path = %self.path.display(), bytes = payload.len(), "stored optimization results");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_sink_appends_one_line_per_payload() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let path = dir.path().join("results.jsonl");
        let sink = FileSink::new(path.clone());

        for payload in [&b"{\"a\":1}"[..], &b"{\"b\":2}"[..]] {
            if let Err(e) = sink.accept(Bytes::copy_from_slice(payload)).await {
                panic!("accept failed: {e}");
            }
        }

        let written = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => panic!("read back: {e}"),
        };
        assert_eq!(written, "{\"a\":1}\n{\"b\":2}\n");
    }

    #[tokio::test]
    async fn file_sink_reports_unwritable_path() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => panic!("tempdir: {e}"),
        };
        let sink = FileSink::new(dir.path().join("missing-dir").join("results.jsonl"));
        let result = sink.accept(Bytes::from_static(b"{}")).await;
        assert!(matches!(result, Err(GatewayError::SinkFailure(_))));
    }

    #[tokio::test]
    async fn log_sink_accepts_any_payload() {
        assert!(LogSink.accept(Bytes::from_static(b"\xff\xfe not utf-8")).await.is_ok());
    }
}
