//! Routing provider settings shared by the `optimize` and `distance`
//! commands.

use std::time::Duration;

use log::warn;
use wayfarer_core::{LatLng, RoutingProvider};
use wayfarer_routing::{
    DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_MAX_PARALLEL_REQUESTS, GreatCircleProvider,
    HttpRoutingProvider, HttpRoutingProviderConfig, OracleConfig,
};

use crate::{ARG_AVERAGE_SPEED, ARG_MAX_PARALLEL, ARG_TIMEOUT_SECS, CliError};

/// Routing options as they arrive from merged configuration layers.
#[derive(Debug, Clone, Default)]
pub(crate) struct RoutingOptions {
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: Option<String>,
    pub(crate) profile: Option<String>,
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) average_speed_kmh: Option<f64>,
    pub(crate) max_parallel: Option<usize>,
}

/// Resolved routing provider and oracle settings.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RoutingConfig {
    /// API key for the routing service; without one every distance is a
    /// great-circle estimate.
    pub(crate) api_key: Option<String>,
    /// Base URL of the routing service.
    pub(crate) base_url: String,
    /// Routing profile, e.g. `driving-car`.
    pub(crate) profile: String,
    /// Per-request timeout.
    pub(crate) timeout: Duration,
    /// Speed used for derived durations.
    pub(crate) average_speed_kmh: f64,
    /// Concurrent lookups while building a distance matrix.
    pub(crate) max_parallel_requests: usize,
}

impl RoutingConfig {
    /// Resolve `options` against the library defaults.
    pub(crate) fn resolve(options: RoutingOptions) -> Result<Self, CliError> {
        let defaults = HttpRoutingProviderConfig::default();
        let timeout = match options.timeout_secs {
            Some(0) => {
                return Err(CliError::InvalidArgument {
                    field: ARG_TIMEOUT_SECS,
                    reason: "must be at least one second".to_owned(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };
        let average_speed_kmh = options
            .average_speed_kmh
            .unwrap_or(DEFAULT_AVERAGE_SPEED_KMH);
        if !(average_speed_kmh.is_finite() && average_speed_kmh > 0.0) {
            return Err(CliError::InvalidArgument {
                field: ARG_AVERAGE_SPEED,
                reason: format!("{average_speed_kmh} is not a positive speed"),
            });
        }
        let max_parallel_requests = match options.max_parallel {
            Some(0) => {
                return Err(CliError::InvalidArgument {
                    field: ARG_MAX_PARALLEL,
                    reason: "must be at least one".to_owned(),
                });
            }
            Some(workers) => workers,
            None => DEFAULT_MAX_PARALLEL_REQUESTS,
        };
        Ok(Self {
            api_key: options.api_key,
            base_url: options.base_url.unwrap_or(defaults.base_url),
            profile: options.profile.unwrap_or(defaults.profile),
            timeout,
            average_speed_kmh,
            max_parallel_requests,
        })
    }

    /// Settings for the HTTP provider.
    pub(crate) fn provider_config(&self) -> HttpRoutingProviderConfig {
        let config = HttpRoutingProviderConfig::new(self.base_url.clone())
            .with_profile(self.profile.clone())
            .with_timeout(self.timeout);
        match &self.api_key {
            Some(api_key) => config.with_api_key(api_key.clone()),
            None => config,
        }
    }

    /// Settings for the distance oracle.
    pub(crate) fn oracle_config(&self) -> OracleConfig {
        OracleConfig::default()
            .with_average_speed_kmh(self.average_speed_kmh)
            .with_max_parallel_requests(self.max_parallel_requests)
    }
}

/// Builds the routing provider for the current invocation.
pub(crate) trait ProviderBuilder {
    fn build(&self, config: &RoutingConfig) -> Result<Box<dyn RoutingProvider>, CliError>;
}

/// Builds an [`HttpRoutingProvider`] from the resolved settings, or a
/// [`GreatCircleProvider`] when no API key is configured.
pub(crate) struct HttpProviderBuilder;

impl ProviderBuilder for HttpProviderBuilder {
    fn build(&self, config: &RoutingConfig) -> Result<Box<dyn RoutingProvider>, CliError> {
        if config.api_key.is_none() {
            warn!("no routing API key configured, distances are great-circle estimates");
            return Ok(Box::new(GreatCircleProvider::new(config.average_speed_kmh)));
        }
        let provider =
            HttpRoutingProvider::with_config(config.provider_config()).map_err(|source| {
                CliError::BuildRoutingProvider {
                    base_url: config.base_url.clone(),
                    source,
                }
            })?;
        Ok(Box::new(provider))
    }
}

/// Parse a `lat,lng` pair.
pub(crate) fn parse_point(field: &'static str, raw: &str) -> Result<LatLng, CliError> {
    let invalid = |reason: String| CliError::InvalidArgument { field, reason };
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| invalid(format!("expected `lat,lng`, found {raw:?}")))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|err| invalid(format!("{part:?} is not a number: {err}")))
    };
    let point = LatLng::new(parse(lat)?, parse(lng)?);
    point.validate(0).map_err(|err| invalid(err.to_string()))?;
    Ok(point)
}
