// ── Position simulator ──
//
// Pure state transition for the synthetic "live" position. The tracker
// owns timing and randomness; this module only says what one tick does.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::GeoPoint;

/// Lowest ETA, in minutes, shown while tracking.
pub const ETA_MIN_MINUTES: u32 = 2;
/// Highest ETA, in minutes, shown while tracking.
pub const ETA_MAX_MINUTES: u32 = 9;

/// Tunables for the simulator. Defaults reproduce the demo's constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Coordinate of stop 0 and the reset position on every selection.
    pub origin: GeoPoint,
    /// Offset added per stop index.
    pub step: GeoPoint,
    pub tick: Duration,
    /// Fraction of the remaining distance covered per tick.
    pub smoothing: f64,
    /// Full width of the uniform per-axis jitter, centred on zero.
    pub jitter: f64,
    /// Chance per tick of moving on to the next stop.
    pub advance_probability: f64,
    pub initial_stop_index: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            origin: GeoPoint::new(40.7128, -74.0060),
            step: GeoPoint::new(0.0007, 0.0005),
            tick: Duration::from_millis(1500),
            smoothing: 0.1,
            jitter: 0.0001,
            advance_probability: 0.1,
            initial_stop_index: 1,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.tick.is_zero() {
            return Err(CoreError::validation("tick period must be positive"));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(CoreError::validation("smoothing must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.advance_probability) {
            return Err(CoreError::validation(
                "advance probability must be within 0..=1",
            ));
        }
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(CoreError::validation("jitter must be a non-negative number"));
        }
        Ok(())
    }
}

/// Position and stop index of one simulated bus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimState {
    pub position: GeoPoint,
    /// Not clamped to the route length: a one-stop route keeps index 1.
    pub stop_index: usize,
}

/// What a single tick changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub advanced: bool,
}

/// Applies ticks according to a fixed set of [`SimulationParams`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Simulator {
    params: SimulationParams,
}

impl Simulator {
    pub fn new(params: SimulationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// State after selecting a bus: origin, initial index.
    pub fn initial_state(&self) -> SimState {
        SimState {
            position: self.params.origin,
            stop_index: self.params.initial_stop_index,
        }
    }

    /// Synthetic coordinate of stop `index`.
    pub fn stop_coordinate(&self, index: usize) -> GeoPoint {
        self.params.origin.offset(self.params.step, index)
    }

    /// Advance `state` by one tick.
    ///
    /// Random draws happen in a fixed order: latitude jitter, longitude
    /// jitter, then the advance roll (only when the route has more than
    /// one stop). The position moves toward the current index's target
    /// before any advance.
    pub fn tick<R: Rng + ?Sized>(
        &self,
        state: &mut SimState,
        stop_count: usize,
        rng: &mut R,
    ) -> TickOutcome {
        let target = self.stop_coordinate(state.stop_index);
        let eased = state.position.approach(target, self.params.smoothing);
        let jitter_lat = self.jitter(rng);
        let jitter_lng = self.jitter(rng);
        state.position = GeoPoint::new(eased.lat + jitter_lat, eased.lng + jitter_lng);

        let advanced =
            stop_count > 1 && rng.gen_range(0.0..1.0) < self.params.advance_probability;
        if advanced {
            state.stop_index = (state.stop_index + 1) % stop_count;
        }
        TickOutcome { advanced }
    }

    /// Minutes until the next stop, uniform over the display range.
    pub fn draw_eta<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(ETA_MIN_MINUTES..=ETA_MAX_MINUTES)
    }

    fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        (rng.gen_range(0.0..1.0) - 0.5) * self.params.jitter
    }
}
