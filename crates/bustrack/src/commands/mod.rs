//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod buses;
pub mod config_cmd;
pub mod serve;
pub mod track;

use bustrack_core::{Controller, SimulationParams};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    params: SimulationParams,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Buses(args) => buses::handle(controller, args, global).await,
        Command::Track(args) => track::handle(controller, args, params, global).await,
        Command::Serve(_) | Command::Config(_) | Command::Completions(_) => {
            // handled before a controller is built
            Ok(())
        }
    }
}
