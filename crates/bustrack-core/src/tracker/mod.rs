// ── Live tracking ──
//
// Per-view simulation state for one selected bus. The tracker owns at
// most one tick task at a time through a `TickerGuard`; every state change
// is published as a `TrackingSnapshot` on a watch channel.

mod snapshot;
mod ticker;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::model::Bus;
use crate::sim::{SimState, SimulationParams, Simulator};

pub use snapshot::{NO_STOP, RouteStop, StopMarker, TrackingSnapshot, UPCOMING_LIMIT, UpcomingStop};
pub use ticker::TickerGuard;

/// Simulated tracking for one selected bus.
///
/// Methods that start a tick task must be called from within a tokio
/// runtime. Dropping the tracker cancels its task; no snapshot is
/// published afterwards.
pub struct Tracker {
    shared: Arc<Shared>,
    ticker: Option<TickerGuard>,
}

struct Shared {
    simulator: Simulator,
    state: Mutex<TrackerState>,
    snapshot_tx: watch::Sender<TrackingSnapshot>,
}

struct TrackerState {
    bus: Option<Arc<Bus>>,
    sim: SimState,
    tracking: bool,
    eta_minutes: Option<u32>,
    tick_count: u64,
    generation: u64,
    /// Identifies the live tick task; bumped whenever it is replaced.
    epoch: u64,
    updated_at: Option<DateTime<Utc>>,
    rng: ChaCha8Rng,
}

impl Tracker {
    pub fn new(params: SimulationParams) -> Self {
        Self::with_rng(params, ChaCha8Rng::from_entropy())
    }

    /// Deterministic tracker for tests and reproducible demos.
    pub fn with_seed(params: SimulationParams, seed: u64) -> Self {
        Self::with_rng(params, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(params: SimulationParams, rng: ChaCha8Rng) -> Self {
        let simulator = Simulator::new(params);
        let state = TrackerState {
            bus: None,
            sim: simulator.initial_state(),
            tracking: false,
            eta_minutes: None,
            tick_count: 0,
            generation: 0,
            epoch: 0,
            updated_at: None,
            rng,
        };
        let (snapshot_tx, _) = watch::channel(state.to_snapshot(&params));
        Self {
            shared: Arc::new(Shared {
                simulator,
                state: Mutex::new(state),
                snapshot_tx,
            }),
            ticker: None,
        }
    }

    pub fn params(&self) -> &SimulationParams {
        self.shared.simulator.params()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackingSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> TrackingSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    pub fn is_tracking(&self) -> bool {
        self.shared.lock().tracking
    }

    pub fn selected(&self) -> Option<Arc<Bus>> {
        self.shared.lock().bus.clone()
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Select a bus.
    ///
    /// A different bus resets position to the origin and the stop index
    /// to its initial value. The same bus (by id) only refreshes the
    /// record. The tracking flag carries over; if on, the tick task is
    /// replaced so the next tick comes one full period from now.
    pub fn select(&mut self, bus: impl Into<Arc<Bus>>) {
        let bus = bus.into();
        let next = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            let same = state.bus.as_ref().is_some_and(|b| b.id == bus.id);
            debug!(bus_id = %bus.id, same, "selecting bus");
            state.bus = Some(bus);
            if !same {
                state.sim = self.shared.simulator.initial_state();
                state.tick_count = 0;
                state.generation += 1;
                state.updated_at = None;
                if state.tracking {
                    state.eta_minutes = Some(self.shared.simulator.draw_eta(&mut state.rng));
                }
            }
            let next = state.replace_ticker();
            self.shared.publish(state);
            next
        };
        self.install_ticker(next);
    }

    /// Turn tracking on. The ETA is drawn immediately; the first tick
    /// follows one period later. A no-op if already tracking.
    pub fn start(&mut self) {
        let next = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            if state.tracking {
                return;
            }
            state.tracking = true;
            if state.bus.is_some() {
                state.eta_minutes = Some(self.shared.simulator.draw_eta(&mut state.rng));
            }
            debug!(generation = state.generation, "tracking started");
            let next = state.replace_ticker();
            self.shared.publish(state);
            next
        };
        self.install_ticker(next);
    }

    /// Turn tracking off, freezing position and stop index.
    pub fn stop(&mut self) {
        {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            if !state.tracking {
                return;
            }
            state.tracking = false;
            state.eta_minutes = None;
            state.epoch += 1;
            debug!(ticks = state.tick_count, "tracking stopped");
            self.shared.publish(state);
        }
        self.ticker = None;
    }

    /// Flip tracking; returns the new flag.
    pub fn toggle(&mut self) -> bool {
        if self.is_tracking() {
            self.stop();
            false
        } else {
            self.start();
            true
        }
    }

    /// Select `bus` and turn tracking on.
    pub fn track(&mut self, bus: impl Into<Arc<Bus>>) {
        self.select(bus);
        self.start();
    }

    // ── Tick task ────────────────────────────────────────────────────

    fn install_ticker(&mut self, epoch: Option<u64>) {
        // Assigning drops (and cancels) the previous guard.
        self.ticker = epoch.map(|epoch| {
            let shared = Arc::clone(&self.shared);
            let period = self.shared.simulator.params().tick;
            TickerGuard::spawn(move |cancel| run_ticks(shared, epoch, period, cancel))
        });
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        // Invalidate the epoch first so a tick racing with cancellation
        // cannot publish.
        self.shared.lock().epoch += 1;
    }
}

impl TrackerState {
    /// Retire the current tick task. Returns the epoch for a new one when
    /// tracking with a bus selected.
    fn replace_ticker(&mut self) -> Option<u64> {
        self.epoch += 1;
        (self.tracking && self.bus.is_some()).then_some(self.epoch)
    }

    fn to_snapshot(&self, params: &SimulationParams) -> TrackingSnapshot {
        TrackingSnapshot {
            bus: self.bus.clone(),
            position: self.sim.position,
            stop_index: self.sim.stop_index,
            tracking: self.tracking,
            eta_minutes: self.eta_minutes,
            tick_count: self.tick_count,
            generation: self.generation,
            updated_at: self.updated_at,
            origin: params.origin,
            step: params.step,
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &TrackerState) {
        self.snapshot_tx
            .send_replace(state.to_snapshot(self.simulator.params()));
    }

    /// Apply one tick if `epoch` is still current. Returns `false` when
    /// the calling task has been superseded.
    fn tick(&self, epoch: u64) -> bool {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.epoch != epoch || !state.tracking {
            return false;
        }
        let Some(bus) = state.bus.clone() else {
            return false;
        };

        let outcome = self
            .simulator
            .tick(&mut state.sim, bus.stops.len(), &mut state.rng);
        state.eta_minutes = Some(self.simulator.draw_eta(&mut state.rng));
        state.tick_count += 1;
        state.updated_at = Some(Utc::now());
        trace!(
            bus_id = %bus.id,
            stop_index = state.sim.stop_index,
            advanced = outcome.advanced,
            "tick"
        );

        // Published under the lock so `stop` can never be overtaken.
        self.publish(state);
        true
    }
}

async fn run_ticks(shared: Arc<Shared>, epoch: u64, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if !shared.tick(epoch) {
                    break;
                }
            }
        }
    }
    trace!(epoch, "tick task finished");
}
