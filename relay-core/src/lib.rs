//! Core types for the home-automation message relay.
//!
//! Defines the outcomes produced by forwarding and entity control, the
//! credential gate for control requests, and the control command itself.
//! Nothing in this crate performs I/O.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod command;
pub mod credential;
pub mod error;
pub mod forward;
pub mod report;

pub use command::{ControlCommand, ControlPayload, DispatchOutcome};
pub use credential::{is_valid, AccessToken};
pub use error::CoreError;
pub use forward::{ForwardFailure, ForwardResult};
pub use report::{DispatchRecord, SequenceReport};
