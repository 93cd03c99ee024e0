use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credential::AccessToken;
use crate::error::CoreError;

/// An instruction for the hub to set one entity to one value.
///
/// Holding an [`AccessToken`] means the credential gate has already been
/// passed; a command with an unvalidated token cannot be built.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ControlCommand {
    /// Hub entity to actuate, e.g. `climate.living_room`.
    pub entity_id: String,
    /// Target value for the entity.
    pub value: f64,
    /// Credential sent as the `Authorization` header.
    pub token: AccessToken,
}

impl ControlCommand {
    /// Builds a command, validating every field.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidToken`] if the token fails the credential
    /// gate, or [`CoreError::InvalidCommand`] if `entity_id` is empty or
    /// `value` is not finite.
    pub fn new(entity_id: &str, value: f64, token: Option<&str>) -> Result<Self, CoreError> {
        let token = AccessToken::parse(token)?;
        if entity_id.trim().is_empty() {
            return Err(CoreError::InvalidCommand {
                field: "entity_id",
                reason: "must not be empty".to_owned(),
            });
        }
        if !value.is_finite() {
            return Err(CoreError::InvalidCommand {
                field: "value",
                reason: format!("{value} is not a finite number"),
            });
        }
        Ok(Self { entity_id: entity_id.to_owned(), value, token })
    }

    /// The JSON body sent to the hub.
    #[must_use]
    pub fn payload(&self) -> ControlPayload<'_> {
        ControlPayload { entity_id: &self.entity_id, value: self.value }
    }
}

/// Wire form of a [`ControlCommand`]: `{"entity_id": .., "value": ..}`.
#[derive(Debug, Serialize)]
pub struct ControlPayload<'a> {
    /// Hub entity the value is applied to.
    pub entity_id: &'a str,
    /// Value to set; always finite.
    pub value: f64,
}

/// Outcome of a single control dispatch.
///
/// None of the variants is fatal to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchOutcome {
    /// The hub replied 200.
    Accepted,
    /// The hub replied with a non-200 status, or the command never left the
    /// process because it failed validation (`status` is `None`).
    Rejected { status: Option<u16> },
    /// The request could not be delivered.
    TransportError(String),
}

impl DispatchOutcome {
    /// Classifies a hub HTTP status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if status == 200 {
            Self::Accepted
        } else {
            Self::Rejected { status: Some(status) }
        }
    }

    /// Returns `true` for [`DispatchOutcome::Accepted`].
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected { status: Some(status) } => write!(f, "rejected with status {status}"),
            Self::Rejected { status: None } => f.write_str("rejected before sending"),
            Self::TransportError(cause) => write!(f, "transport error: {cause}"),
        }
    }
}
