//! Access-token gate applied before any control request leaves the process.
//!
//! The check is structural only. Signature and expiry are the hub's concern:
//! it issued the token and is the one that will verify it.

use std::fmt;

use crate::error::CoreError;

/// Returns `true` if `token` may be attached to an outbound control request.
///
/// Absent and empty tokens are rejected, as are tokens containing anything
/// other than visible ASCII, space or tab (they cannot travel in an
/// `Authorization` header).
#[must_use]
pub fn is_valid(token: Option<&str>) -> bool {
    AccessToken::parse(token).is_ok()
}

/// A token that has passed [`is_valid`].
///
/// `Debug` is redacted so the secret never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct AccessToken(String);

impl AccessToken {
    /// Validates an optional raw token.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidToken`] if the token is absent, empty, or
    /// contains bytes that are not allowed in a header value.
    pub fn parse(token: Option<&str>) -> Result<Self, CoreError> {
        let Some(token) = token else {
            return Err(CoreError::InvalidToken { reason: "token is absent" });
        };
        if token.is_empty() {
            return Err(CoreError::InvalidToken { reason: "token is empty" });
        }
        if !token.bytes().all(is_header_byte) {
            return Err(CoreError::InvalidToken {
                reason: "token contains characters not allowed in a header value",
            });
        }
        Ok(Self(token.to_owned()))
    }

    /// Returns the raw token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for AccessToken {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(Some(value))
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

fn is_header_byte(b: u8) -> bool {
    b == b'\t' || (0x20..0x7f).contains(&b)
}
