//! Optimize command implementation for the Wayfarer CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use wayfarer_core::{OptimizeRequest, OptimizeResponse, RouteOptimizer};
use wayfarer_optimizer::{HybridOptimizer, OptimizerConfig};
use wayfarer_routing::DistanceOracle;

use crate::fs::{file_is_file, open_utf8_file};
use crate::output::write_outcome;
use crate::routing::{HttpProviderBuilder, ProviderBuilder, RoutingConfig, RoutingOptions};
use crate::{
    ARG_API_KEY, ARG_AVERAGE_SPEED, ARG_BASE_URL, ARG_EXPLOIT_ROUNDS, ARG_EXPLORE_ROUNDS,
    ARG_MAX_PARALLEL, ARG_PROFILE, ARG_REQUEST, ARG_SEED, ARG_TIMEOUT_SECS, CliError,
    ENV_REQUEST,
};

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Optimize the visiting order of the waypoints in a JSON \
                 OptimizeRequest using road distances from \
                 OpenRouteService. The response, including ranked \
                 alternative routes, is printed as a JSON envelope.",
    about = "Optimize a multi-stop route"
)]
#[ortho_config(prefix = "WAYFARER")]
pub(crate) struct OptimizeArgs {
    /// Path to a JSON file containing an OptimizeRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
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
    /// Speed used to derive leg durations, in km/h.
    #[arg(long = ARG_AVERAGE_SPEED, value_name = "kmh")]
    #[serde(default)]
    pub(crate) average_speed_kmh: Option<f64>,
    /// Concurrent routing lookups while building the distance matrix.
    #[arg(long = ARG_MAX_PARALLEL, value_name = "n")]
    #[serde(default)]
    pub(crate) max_parallel: Option<usize>,
    /// Override the seed carried by the request.
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Rounds of annealed sampling.
    #[arg(long = ARG_EXPLORE_ROUNDS, value_name = "n")]
    #[serde(default)]
    pub(crate) explore_rounds: Option<usize>,
    /// Rounds of whale optimization.
    #[arg(long = ARG_EXPLOIT_ROUNDS, value_name = "n")]
    #[serde(default)]
    pub(crate) exploit_rounds: Option<usize>,
}

impl OptimizeArgs {
    pub(crate) fn into_config(self) -> Result<OptimizeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OptimizeConfig::try_from(merged)
    }
}

/// Resolved `optimize` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OptimizeConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Routing provider and oracle settings.
    pub(crate) routing: RoutingConfig,
    /// Seed replacing the request's own.
    pub(crate) seed: Option<u64>,
    /// Pipeline tuning.
    pub(crate) optimizer: OptimizerConfig,
}

impl OptimizeConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        let path = &self.request_path;
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field: ARG_REQUEST,
                path: path.clone(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field: ARG_REQUEST,
                    path: path.clone(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_REQUEST,
                path: path.clone(),
                source,
            }),
        }
    }
}

impl TryFrom<OptimizeArgs> for OptimizeConfig {
    type Error = CliError;

    fn try_from(args: OptimizeArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_REQUEST,
        })?;
        let routing = RoutingConfig::resolve(RoutingOptions {
            api_key: args.api_key,
            base_url: args.base_url,
            profile: args.profile,
            timeout_secs: args.timeout_secs,
            average_speed_kmh: args.average_speed_kmh,
            max_parallel: args.max_parallel,
        })?;
        let mut optimizer = OptimizerConfig::default();
        if let Some(rounds) = args.explore_rounds {
            optimizer = optimizer.with_explore_rounds(rounds);
        }
        if let Some(rounds) = args.exploit_rounds {
            optimizer = optimizer.with_exploit_rounds(rounds);
        }
        Ok(Self {
            request_path,
            routing,
            seed: args.seed,
            optimizer,
        })
    }
}

/// Builds the optimizer for the current invocation.
pub(crate) trait OptimizerBuilder {
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn RouteOptimizer>, CliError>;
}

/// Wires a provider from `P` into a [`HybridOptimizer`].
pub(crate) struct HybridOptimizerBuilder<P> {
    pub(crate) providers: P,
}

impl<P: ProviderBuilder> OptimizerBuilder for HybridOptimizerBuilder<P> {
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn RouteOptimizer>, CliError> {
        let provider = self.providers.build(&config.routing)?;
        let oracle = DistanceOracle::new(provider, config.routing.oracle_config());
        Ok(Box::new(HybridOptimizer::with_config(
            oracle,
            config.optimizer,
        )))
    }
}

pub(super) fn run_optimize(args: OptimizeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = HybridOptimizerBuilder {
        providers: HttpProviderBuilder,
    };
    run_optimize_with(args, &builder, &mut stdout)
}

pub(super) fn run_optimize_with(
    args: OptimizeArgs,
    builder: &dyn OptimizerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    write_outcome(writer, execute_optimize(args, builder))
}

fn execute_optimize(
    args: OptimizeArgs,
    builder: &dyn OptimizerBuilder,
) -> Result<OptimizeResponse, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let mut request = load_optimize_request(&config.request_path)?;
    if let Some(seed) = config.seed {
        request.seed = seed;
    }
    info!(
        "loaded {} waypoints from {}",
        request.waypoints.len(),
        config.request_path
    );
    let optimizer = builder.build(&config)?;
    optimizer
        .optimize(&request)
        .map_err(|source| CliError::Optimize { source })
}

/// Loads a JSON-encoded [`OptimizeRequest`] from disk.
pub(super) fn load_optimize_request(path: &Utf8Path) -> Result<OptimizeRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseRequest {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<OptimizeConfig, CliError> {
    let merged = OptimizeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    OptimizeConfig::try_from(merged)
}
