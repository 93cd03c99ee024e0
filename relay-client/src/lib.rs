//! Outbound side of the relay.
//!
//! Forwards payloads to downstream services, sends authenticated control
//! values to the hub, and paces control sequences. Every network call ends
//! in an outcome value; none of them returns an error to its caller.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod dispatcher;
pub mod error;
mod http;
pub mod proxy;
pub mod sequencer;

pub use config::{ClientConfig, SequencerConfig};
pub use dispatcher::{Dispatcher, HttpDispatcher};
pub use error::ClientError;
pub use proxy::ForwardingProxy;
pub use sequencer::CommandSequencer;
