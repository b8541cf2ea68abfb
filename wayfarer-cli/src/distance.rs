//! Distance command: a single oracle lookup between two points.

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use wayfarer_core::{LatLng, RoadRoute};
use wayfarer_routing::DistanceOracle;

use crate::output::write_outcome;
use crate::routing::{
    HttpProviderBuilder, ProviderBuilder, RoutingConfig, RoutingOptions, parse_point,
};
use crate::{
    ARG_ALTERNATIVES, ARG_API_KEY, ARG_AVERAGE_SPEED, ARG_BASE_URL, ARG_FROM, ARG_PROFILE,
    ARG_TIMEOUT_SECS, ARG_TO, CliError, ENV_FROM, ENV_TO,
};

/// CLI arguments for the `distance` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Look up the road distance, duration and path between two \
                 points. When the routing service is unreachable the \
                 result is a great-circle estimate. With --alternatives \
                 a ranked list of distinct routes is printed instead.",
    about = "Look up a road distance"
)]
#[ortho_config(prefix = "WAYFARER")]
pub(crate) struct DistanceArgs {
    /// Departure point as "lat,lng".
    #[arg(long = ARG_FROM, value_name = "lat,lng", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Arrival point as "lat,lng".
    #[arg(long = ARG_TO, value_name = "lat,lng", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) to: Option<String>,
    /// Return up to this many distinct routes.
    #[arg(long = ARG_ALTERNATIVES, value_name = "n")]
    #[serde(default)]
    pub(crate) alternatives: Option<usize>,
    /// OpenRouteService API key. Without one, distances are estimated.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Base URL of the routing service.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Routing profile, e.g. "driving-car".
    #[arg(long = ARG_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) profile: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Speed used to derive durations, in km/h.
    #[arg(long = ARG_AVERAGE_SPEED, value_name = "kmh")]
    #[serde(default)]
    pub(crate) average_speed_kmh: Option<f64>,
}

impl DistanceArgs {
    pub(crate) fn into_config(self) -> Result<DistanceConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DistanceConfig::try_from(merged)
    }
}

/// Resolved `distance` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DistanceConfig {
    pub(crate) from: LatLng,
    pub(crate) to: LatLng,
    /// Requested route count; `None` asks for the single best route.
    pub(crate) alternatives: Option<usize>,
    pub(crate) routing: RoutingConfig,
}

impl TryFrom<DistanceArgs> for DistanceConfig {
    type Error = CliError;

    fn try_from(args: DistanceArgs) -> Result<Self, Self::Error> {
        let from = args.from.ok_or(CliError::MissingArgument {
            field: ARG_FROM,
            env: ENV_FROM,
        })?;
        let to = args.to.ok_or(CliError::MissingArgument {
            field: ARG_TO,
            env: ENV_TO,
        })?;
        if args.alternatives == Some(0) {
            return Err(CliError::InvalidArgument {
                field: ARG_ALTERNATIVES,
                reason: "must be at least one".to_owned(),
            });
        }
        let routing = RoutingConfig::resolve(RoutingOptions {
            api_key: args.api_key,
            base_url: args.base_url,
            profile: args.profile,
            timeout_secs: args.timeout_secs,
            average_speed_kmh: args.average_speed_kmh,
            max_parallel: None,
        })?;
        Ok(Self {
            from: parse_point(ARG_FROM, &from)?,
            to: parse_point(ARG_TO, &to)?,
            alternatives: args.alternatives,
            routing,
        })
    }
}

/// Payload of a successful `distance` run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum DistanceOutput {
    Single(RoadRoute),
    Alternatives(Vec<RoadRoute>),
}

pub(super) fn run_distance(args: DistanceArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_distance_with(args, &HttpProviderBuilder, &mut stdout)
}

pub(super) fn run_distance_with(
    args: DistanceArgs,
    builder: &dyn ProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    write_outcome(writer, execute_distance(args, builder))
}

fn execute_distance(
    args: DistanceArgs,
    builder: &dyn ProviderBuilder,
) -> Result<DistanceOutput, CliError> {
    let config = args.into_config()?;
    let provider = builder.build(&config.routing)?;
    let oracle = DistanceOracle::new(provider, config.routing.oracle_config());
    let output = match config.alternatives {
        None => oracle.distance(config.from, config.to).map(DistanceOutput::Single),
        Some(count) => oracle
            .alternatives(config.from, config.to, count)
            .map(DistanceOutput::Alternatives),
    };
    output.map_err(|source| CliError::Distance { source })
}
