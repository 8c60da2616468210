//! Reactive data layer and position simulator between `bustrack-api` and
//! the CLI / TUI front ends.
//!
//! - **[`Controller`]**: facade over the REST client. Loads the fleet into
//!   the [`BusStore`], executes [`Command`]s (create, update, track ack) and
//!   reloads after writes.
//!
//! - **[`BusStore`]**: `DashMap` + `tokio::sync::watch` storage that keeps
//!   registry order and vends [`EntityStream`] subscriptions.
//!
//! - **[`Tracker`]**: per-view simulation state for one selected bus. Owns a
//!   single cancellable tick task ([`TickerGuard`]) and publishes
//!   [`TrackingSnapshot`]s on a watch channel.
//!
//! - **Admin drafts** ([`admin`]): the add-route and edit-status forms,
//!   mapped field by field onto [`NewBus`].
//!
//! - **Domain model** ([`model`]): [`Bus`] with its ordered [`Stop`] pairs,
//!   [`BusId`] covering both UUID and plain seed identifiers.

pub mod admin;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod filter;
pub mod model;
pub mod sim;
pub mod store;
pub mod stream;
pub mod tracker;

// ── Primary re-exports ──────────────────────────────────────────────
pub use admin::{BusEdit, BusField, RouteDraft, StopDraft};
pub use command::{Command, CommandResult};
pub use config::ClientConfig;
pub use controller::{ConnectionState, Controller};
pub use error::{CoreError, Operation};
pub use filter::{BusFilter, FleetSummary, distinct_routes};
pub use sim::{SimState, SimulationParams, Simulator};
pub use store::BusStore;
pub use stream::EntityStream;
pub use tracker::{RouteStop, StopMarker, TickerGuard, Tracker, TrackingSnapshot, UpcomingStop};

pub use model::{Bus, BusId, GeoPoint, LoadLevel, NewBus, Stop, TrackingAck};
