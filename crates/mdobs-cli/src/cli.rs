use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan",
    version,
    about = "mdobs CLI - Replays particle trajectories through a lazy energy-frame output and writes the resulting energy file.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel reductions.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a CSV trajectory through the energy output and write a CSV energy file.
    Replay(ReplayArgs),
    /// List the built-in observables that can be requested in a run file.
    Observables,
}

/// Arguments for the `replay` subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to the run file in TOML format (output intervals, observables, box, topology).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Path to the trajectory CSV with columns step,time,atom,x,y,z[,vx,vy,vz].
    #[arg(short, long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,

    /// Path for the energy CSV file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path for the human-readable energy log.
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Override the energy frame interval from the run file.
    #[arg(long, value_name = "STEPS")]
    pub nstenergy: Option<u64>,

    /// Override the summation interval from the run file.
    #[arg(long, value_name = "STEPS")]
    pub nstcalcenergy: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn replay_arguments_parse() {
        let cli = Cli::try_parse_from([
            "mdobs",
            "-vv",
            "replay",
            "--config",
            "run.toml",
            "--trajectory",
            "traj.csv",
            "--output",
            "energy.csv",
            "--nstenergy",
            "50",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Replay(args) = cli.command else {
            panic!("expected the replay subcommand");
        };
        assert_eq!(args.config, PathBuf::from("run.toml"));
        assert_eq!(args.nstenergy, Some(50));
        assert_eq!(args.nstcalcenergy, None);
        assert!(args.log.is_none());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["mdobs", "-q", "-v", "observables"]);
        assert!(result.is_err());
    }
}
