//! Data bridge: connects [`Controller`] streams to TUI actions.
//!
//! Runs as a background task: loads the fleet, then forwards every store
//! change and load-state transition as an [`Action`] through the TUI's
//! action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use bustrack_core::{ConnectionState, Controller, Operation};

use crate::action::{Action, Notification};

/// Spawn the data bridge connecting [`Controller`] reactive streams to the TUI.
///
/// Subscribes first so the initial load arrives as an ordinary change, then
/// loops until cancelled.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut buses = controller.buses();
    let mut load_state = controller.connection_state();

    let initial = buses.current().clone();
    if !initial.is_empty() {
        let _ = action_tx.send(Action::BusesUpdated(initial));
    }

    refresh(&controller, &action_tx).await;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = buses.changed() => {
                debug!(count = snapshot.len(), "dispatching BusesUpdated");
                let _ = action_tx.send(Action::BusesUpdated(snapshot));
            }
            Ok(()) = load_state.changed() => {
                let state = *load_state.borrow_and_update();
                let action = match state {
                    ConnectionState::Loading => Action::Loading,
                    ConnectionState::Loaded => Action::Loaded,
                    ConnectionState::Failed => {
                        Action::LoadFailed(Operation::Load.failure_message().into())
                    }
                    ConnectionState::Idle => continue,
                };
                let _ = action_tx.send(action);
            }
        }
    }

    debug!("data bridge shut down");
}

/// Reload the fleet; a failure becomes an error toast.
pub async fn refresh(controller: &Controller, action_tx: &mpsc::UnboundedSender<Action>) {
    if let Err(e) = controller.refresh().await {
        debug!(error = %e, "refresh from the TUI failed");
        let _ = action_tx.send(Action::Notify(Notification::error(
            e.user_message(Operation::Load),
        )));
    }
}
