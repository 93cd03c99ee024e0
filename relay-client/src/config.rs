//! Outbound client and sequencer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bound on one outbound exchange (connect, send, read body).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of values a sequencer run dispatches.
pub const DEFAULT_CONTROL_CAP: usize = 2;

/// Default pause between two consecutive dispatches.
pub const DEFAULT_CONTROL_DELAY: Duration = Duration::from_secs(2);

/// Settings shared by every outbound HTTP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ClientConfig {
    /// Upper bound on a whole exchange. Expiry is reported as a transport
    /// failure.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Create a config with the given request timeout.
    #[must_use]
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

/// Rate limiting applied by [`CommandSequencer`](crate::CommandSequencer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SequencerConfig {
    /// At most this many leading values are dispatched per run.
    pub cap: usize,
    /// Pause after each dispatch except the last.
    pub delay: Duration,
}

impl SequencerConfig {
    /// Create a config with an explicit cap and delay.
    #[must_use]
    pub fn new(cap: usize, delay: Duration) -> Self {
        Self { cap, delay }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONTROL_CAP, DEFAULT_CONTROL_DELAY)
    }
}
