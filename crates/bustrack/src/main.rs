mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bustrack_core::Controller;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The server logs requests at info; client commands stay quiet.
    let serving = matches!(cli.command, Command::Serve(_));
    init_tracing(cli.global.verbose, serving);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, serving: bool) {
    let filter = match verbosity {
        0 if serving => "info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "bustrack", &mut std::io::stdout());
            Ok(())
        }

        Command::Serve(args) => commands::serve::handle(args, &cli.global).await,

        // Everything else talks to a running server
        cmd => {
            let cfg = config::resolve(&cli.global)?;
            let controller = Controller::new(config::client_config(&cfg)?)
                .map_err(|e| CliError::from_core(e, bustrack_core::Operation::Load))?;
            let params = config::simulation_params(&cfg)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &controller, params, &cli.global).await
        }
    }
}
