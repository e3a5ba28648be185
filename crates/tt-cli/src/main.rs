//! CLI frontend for the Tabletracker game-state tracker.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use tt_store::JsonFileStore;
use tt_tracker::{CascadePolicy, Tracker, TrackerConfig, TrackerResult};

use commands::character::CharacterAction;
use commands::encounter::EncounterAction;
use commands::instance::InstanceAction;

#[derive(Parser)]
#[command(
    name = "tt",
    about = "Tabletracker: characters, campaigns, and initiative for tabletop RPGs",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data file (default: from config, else tabletracker.json)
    #[arg(long, global = true, env = "TT_DATA")]
    data: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true, env = "TT_CONFIG")]
    config: Option<PathBuf>,

    /// What deleting an instance removes
    #[arg(long, global = true, value_enum)]
    cascade: Option<Cascade>,

    /// Log at debug level unless TT_LOG or RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Cascade {
    /// Delete owned characters, keep encounters
    #[value(alias = "characters")]
    CharactersOnly,
    /// Delete owned characters and encounters
    #[value(alias = "all")]
    CharactersAndEncounters,
}

impl From<Cascade> for CascadePolicy {
    fn from(cascade: Cascade) -> Self {
        match cascade {
            Cascade::CharactersOnly => Self::CharactersOnly,
            Cascade::CharactersAndEncounters => Self::CharactersAndEncounters,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Manage game instances (sessions and campaigns)
    Instance {
        #[command(subcommand)]
        action: InstanceAction,
    },

    /// Manage characters and their hit points and armor class
    Character {
        #[command(subcommand)]
        action: CharacterAction,
    },

    /// Run encounters and track initiative
    Encounter {
        #[command(subcommand)]
        action: EncounterAction,
    },

    /// Delete characters and encounters whose instance no longer exists
    Sweep,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> TrackerResult<()> {
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(data) = cli.data {
        config = config.with_data_file(data);
    }
    if let Some(cascade) = cli.cascade {
        config = config.with_cascade(cascade.into());
    }

    init_logging(&config, cli.verbose);

    let store = JsonFileStore::open(&config.data_file)?;
    let mut tracker = Tracker::open(store, config)?;

    match cli.command {
        Commands::Instance { action } => commands::instance::run(&mut tracker, action),
        Commands::Character { action } => commands::character::run(&mut tracker, action),
        Commands::Encounter { action } => commands::encounter::run(&mut tracker, action),
        Commands::Sweep => commands::sweep::run(&mut tracker),
    }
}

/// Install the stderr subscriber. `TT_LOG` wins over `RUST_LOG`, which
/// wins over the configured default.
fn init_logging(config: &TrackerConfig, verbose: bool) {
    let default = if verbose {
        "debug"
    } else {
        config.log_filter.as_str()
    };
    let filter = EnvFilter::try_from_env("TT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
