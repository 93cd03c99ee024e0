//! HTTP relay between the home-automation hub and the optimization engine.
//!
//! Forwards payloads between the two services, takes in optimization
//! results, serves the model-data resource, and hosts the out-of-band
//! entity-control tool.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod message;
pub mod model_data;
pub mod options;
pub mod routes;
pub mod sink;
pub mod telemetry;

pub use error::GatewayError;
pub use options::ServerOptions;
pub use routes::{create_router, AppState};
