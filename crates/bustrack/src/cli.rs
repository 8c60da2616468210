//! Clap derive structures for the `bustrack` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bustrack -- demo bus fleet registry and live tracking
#[derive(Debug, Parser)]
#[command(
    name = "bustrack",
    version,
    about = "Browse, edit and live-track the bustrack demo fleet",
    long_about = "Command-line client and server for the bustrack demo.\n\n\
        `bustrack serve` runs the REST registry; every other command talks\n\
        to it over HTTP. Live tracking is simulated locally.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// REST API base URL (overrides config)
    #[arg(long, env = "BUSTRACK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BUSTRACK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "BUSTRACK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the REST server
    Serve(ServeArgs),

    /// List, inspect, add and edit buses
    #[command(alias = "b")]
    Buses(BusesArgs),

    /// Simulate live tracking for one bus
    Track(TrackArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SERVE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind (default from config: 0.0.0.0)
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on (default from config: 5000)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Store URL: memory://, memory://empty, or file:///abs/dir
    #[arg(long)]
    pub store: Option<String>,

    /// Exit instead of serving 503s when the store cannot be opened
    #[arg(long)]
    pub fail_fast: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BUSES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BusesArgs {
    #[command(subcommand)]
    pub command: BusesCommand,
}

#[derive(Debug, Subcommand)]
pub enum BusesCommand {
    /// List buses
    #[command(alias = "ls")]
    List {
        /// Case-insensitive match on bus number, route or stop name
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only buses on this exact route
        #[arg(long, short = 'r')]
        route: Option<String>,
    },

    /// Show one bus with its full schedule
    #[command(alias = "get")]
    Show {
        /// Bus ID
        id: String,
    },

    /// Add a new bus route
    Add {
        /// Bus number, e.g. 201
        #[arg(long, short = 'n')]
        number: String,

        /// Route name
        #[arg(long, short = 'r')]
        route: String,

        /// Stop with its scheduled time, as "Name@HH:MM" (repeatable, in order)
        #[arg(long = "stop", required = true)]
        stops: Vec<String>,

        /// Seat capacity
        #[arg(long, default_value = "50")]
        capacity: u32,

        /// Current occupancy
        #[arg(long, default_value = "0")]
        occupancy: u32,

        #[arg(long)]
        current_location: Option<String>,

        #[arg(long)]
        next_stop: Option<String>,

        #[arg(long)]
        eta: Option<String>,
    },

    /// Edit a bus (full replace with the given fields changed)
    Edit {
        /// Bus ID
        id: String,

        /// Field assignment, e.g. --set eta="4 mins" (repeatable)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        assignments: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TRACK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Bus ID
    pub id: String,

    /// Stop after this many ticks (default: run until Ctrl-C)
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub ticks: Option<u64>,

    /// Seed the simulator for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
