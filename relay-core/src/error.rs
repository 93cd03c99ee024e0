/// Errors produced by the `relay-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// An access token was absent, empty, or not representable as a header value.
    #[error("invalid access token: {reason}")]
    InvalidToken { reason: &'static str },

    /// A control command field failed validation.
    #[error("invalid control command field '{field}': {reason}")]
    InvalidCommand { field: &'static str, reason: String },
}
