// ── Domain model ──
//
// Canonical types shared by the store, the simulator and every front end.
// Wire documents from `bustrack-api` are converted into these in
// `crate::convert`.

pub mod bus;
pub mod bus_id;
pub mod geo;

pub use bus::{Bus, LoadLevel, NewBus, Stop, TrackingAck};
pub use bus_id::BusId;
pub use geo::GeoPoint;
