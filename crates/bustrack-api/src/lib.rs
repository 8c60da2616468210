//! Async Rust client for the bustrack REST API.
//!
//! - **[`BusClient`]**: thin `reqwest` wrapper that builds `/api/...` URLs,
//!   sends JSON bodies, and turns non-success statuses into [`Error::Api`].
//! - **Wire types** ([`models`]): the JSON documents exchanged with the
//!   server. Stops and schedule travel as parallel arrays; `bustrack-core`
//!   folds them into ordered stop pairs.
//! - **[`TransportConfig`]**: timeout and user-agent shared by every client.

pub mod buses;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::BusClient;
pub use error::Error;
pub use models::{BusDraft, BusRecord, ErrorBody, TrackAck, TrackRequest};
pub use transport::TransportConfig;
