use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of relaying a payload to a downstream service.
///
/// `Forwarded` is only ever produced for an HTTP 200 reply; every other
/// status is a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardResult {
    /// The downstream service accepted the payload with this status.
    Forwarded(u16),
    /// The payload did not reach the downstream service, or it refused it.
    Failed(ForwardFailure),
}

impl ForwardResult {
    /// Classifies a downstream HTTP status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if status == 200 {
            Self::Forwarded(status)
        } else {
            Self::Failed(ForwardFailure::Status(status))
        }
    }

    /// Returns `true` for [`ForwardResult::Forwarded`].
    #[must_use]
    pub fn is_forwarded(&self) -> bool {
        matches!(self, Self::Forwarded(_))
    }
}

/// Why a forward attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardFailure {
    /// The downstream service replied with a non-200 status.
    Status(u16),
    /// Connection refused, timeout, bad URL or any other transport fault.
    Transport(String),
}

impl fmt::Display for ForwardFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "downstream replied with status {status}"),
            Self::Transport(cause) => write!(f, "transport error: {cause}"),
        }
    }
}
