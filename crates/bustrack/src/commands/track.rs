//! Live tracking in the terminal: one status line per simulator tick.

use serde::Serialize;
use tracing::debug;

use bustrack_core::{
    BusId, Command as CoreCommand, Controller, GeoPoint, Operation, SimulationParams, Tracker,
    TrackingSnapshot,
};

use crate::cli::{GlobalOpts, OutputFormat, TrackArgs};
use crate::error::CliError;
use crate::output;

/// One tick as printed in JSON modes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TickLine {
    tick: u64,
    bus_id: String,
    position: GeoPoint,
    stop_index: usize,
    current_stop: String,
    next_stop: String,
    eta: String,
}

impl From<&TrackingSnapshot> for TickLine {
    fn from(s: &TrackingSnapshot) -> Self {
        Self {
            tick: s.tick_count,
            bus_id: s
                .bus
                .as_ref()
                .map(|b| b.id.to_string())
                .unwrap_or_default(),
            position: s.position,
            stop_index: s.stop_index,
            current_stop: s.display_current(),
            next_stop: s.display_next(),
            eta: s.display_eta(),
        }
    }
}

fn render_tick(format: &OutputFormat, snap: &TrackingSnapshot) -> Result<String, CliError> {
    let line = TickLine::from(snap);
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
            output::render_json(&line, true)
        }
        OutputFormat::Plain => Ok(format!(
            "{}\t{:.6}\t{:.6}\t{}",
            line.tick, line.position.lat, line.position.lng, line.current_stop
        )),
        OutputFormat::Table => Ok(format!(
            "#{:<4} {}  at {:<20} next {:<20} eta {}",
            line.tick, line.position, line.current_stop, line.next_stop, line.eta
        )),
    }
}

pub async fn handle(
    controller: &Controller,
    args: TrackArgs,
    params: SimulationParams,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = BusId::from(args.id);
    let bus = controller
        .get_bus(&id)
        .await
        .map_err(|e| CliError::from_core(e, Operation::Load))?;

    // The ack is informational; the simulation runs regardless.
    if let Err(e) = controller.execute(CoreCommand::TrackBus { id }).await {
        eprintln!("warning: {}", e.user_message(Operation::Track));
        debug!(error = %e, "track ack failed");
    }

    let mut tracker = match args.seed {
        Some(seed) => Tracker::with_seed(params, seed),
        None => Tracker::new(params),
    };
    let mut rx = tracker.subscribe();
    if !global.quiet {
        eprintln!("Tracking {} (Ctrl-C to stop)", bus.label());
    }
    tracker.track(bus);

    let mut last_tick = 0;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = rx.borrow_and_update().clone();
                if snap.tick_count == last_tick {
                    continue;
                }
                last_tick = snap.tick_count;
                output::print_output(&render_tick(&global.output, &snap)?, global.quiet);
                if args.ticks.is_some_and(|n| last_tick >= n) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracker.stop();
    Ok(())
}
