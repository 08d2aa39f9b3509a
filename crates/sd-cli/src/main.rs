//! CLI frontend for the sector-dynamics simulator.

mod commands;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use sd_simulation::{CrushMode, SimConfig};

#[derive(Parser)]
#[command(
    name = "sd",
    about = "Sector dynamics: run doors, lifts, crushers and scrollers tic by tic",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log debug output and list every event
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum CrushArg {
    Doom,
    Hexen,
    Slowdown,
}

impl From<CrushArg> for CrushMode {
    fn from(arg: CrushArg) -> Self {
        match arg {
            CrushArg::Doom => Self::Doom,
            CrushArg::Hexen => Self::Hexen,
            CrushArg::Slowdown => Self::Slowdown,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load a level, apply an activation script and run it
    Run {
        /// Level file (JSON)
        level: PathBuf,

        /// Activation script: a JSON list of activations applied at tic 0
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Number of tics to run (35 tics = 1 second)
        #[arg(short, long, default_value = "35")]
        tics: u64,

        /// RNG seed for perpetual platform start directions
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Crush mode for activations that do not name one
        #[arg(long, value_enum, default_value = "doom")]
        crush_mode: CrushArg,

        /// Write a snapshot of the final state to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Validate a level file without running it
    Check {
        /// Level file (JSON)
        level: PathBuf,
    },

    /// Restore a saved snapshot onto its level and keep running
    Resume {
        /// Level file (JSON) the snapshot was taken from
        level: PathBuf,

        /// Snapshot file written by `run --save`
        snapshot: PathBuf,

        /// Number of tics to run
        #[arg(short, long, default_value = "35")]
        tics: u64,

        /// Write a snapshot of the final state to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            level,
            script,
            tics,
            seed,
            crush_mode,
            save,
        } => {
            let config = SimConfig::default()
                .with_seed(seed)
                .with_crush_mode(crush_mode.into());
            commands::run::run(
                &level,
                script.as_deref(),
                tics,
                config,
                save.as_deref(),
                cli.verbose,
            )
        }
        Commands::Check { level } => commands::check::run(&level),
        Commands::Resume {
            level,
            snapshot,
            tics,
            save,
        } => commands::resume::run(&level, &snapshot, tics, save.as_deref(), cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
