// ── Geographic point ──

use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in decimal degrees.
///
/// Also used for per-stop offsets, where both components are deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `self + k * step`, component-wise.
    #[allow(clippy::cast_precision_loss)]
    pub fn offset(self, step: GeoPoint, k: usize) -> Self {
        let k = k as f64;
        Self {
            lat: self.lat + k * step.lat,
            lng: self.lng + k * step.lng,
        }
    }

    /// Move `factor` of the way toward `target`.
    pub fn approach(self, target: GeoPoint, factor: f64) -> Self {
        Self {
            lat: self.lat + (target.lat - self.lat) * factor,
            lng: self.lng + (target.lng - self.lng) * factor,
        }
    }

    /// Four-decimal rendering used for stop coordinates.
    pub fn short(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Six decimals, the precision of the live position readout.
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}
