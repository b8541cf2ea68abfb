//! Command-line interface for the Wayfarer route optimizer.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use log::debug;

mod distance;
mod error;
mod fs;
mod optimize;
mod output;
mod routing;

pub use error::CliError;

use distance::{DistanceArgs, run_distance};
use optimize::{OptimizeArgs, run_optimize};

const ARG_REQUEST: &str = "request";
const ARG_API_KEY: &str = "api-key";
const ARG_BASE_URL: &str = "base-url";
const ARG_PROFILE: &str = "profile";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_AVERAGE_SPEED: &str = "average-speed";
const ARG_MAX_PARALLEL: &str = "max-parallel";
const ARG_SEED: &str = "seed";
const ARG_EXPLORE_ROUNDS: &str = "explore-rounds";
const ARG_EXPLOIT_ROUNDS: &str = "exploit-rounds";
const ARG_FROM: &str = "from";
const ARG_TO: &str = "to";
const ARG_ALTERNATIVES: &str = "alternatives";
const ENV_REQUEST: &str = "WAYFARER_CMDS_OPTIMIZE_REQUEST_PATH";
const ENV_FROM: &str = "WAYFARER_CMDS_DISTANCE_FROM";
const ENV_TO: &str = "WAYFARER_CMDS_DISTANCE_TO";

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Run the Wayfarer CLI with the current process arguments and environment.
///
/// Commands print a JSON envelope on stdout. Logs go to stderr.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging();
    match cli.command {
        Command::Optimize(args) => run_optimize(args),
        Command::Distance(args) => run_distance(args),
    }
}

fn init_logging() {
    let env = env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    if let Err(err) = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .try_init()
    {
        debug!("keeping the logger already installed: {err}");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wayfarer",
    about = "Road-aware multi-stop route optimization",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Optimize the visiting order of a set of waypoints.
    Optimize(OptimizeArgs),
    /// Look up the road distance between two points.
    Distance(DistanceArgs),
}

#[cfg(test)]
mod tests;
