//! Cached, failure-tolerant access to road distances.
//!
//! [`DistanceOracle`] wraps a [`RoutingProvider`] and answers three kinds of
//! query: a single route between two points, a ranked list of alternative
//! routes, and a full distance matrix for a set of waypoints. Every answer is
//! memoised in a [`RouteCache`] for the lifetime of the oracle.
//!
//! Provider failures are classified before they reach the caller:
//!
//! - `RouteNotFound` means the road network has no path. It is cached and
//!   surfaced as [`OracleError::RouteImpossible`], unless
//!   [`OracleConfig::fallback_on_unreachable`] is set.
//! - `RouteTooLong` on a multi-route request triggers synthesis from
//!   single-route queries under different [`RoutePreference`]s.
//! - Anything else is transient. The oracle substitutes a great-circle
//!   estimate and caches it so the provider is not asked again.

mod config;
mod error;

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};
use rayon::prelude::*;
use wayfarer_core::{
    DistanceMatrix, LatLng, ProviderError, RoadRoute, RoutePreference, RoutingProvider, Waypoint,
};

use crate::cache::{RouteCache, RouteKey};
use crate::fallback::{fallback_route, minutes_at};

pub use config::{
    DEFAULT_ALTERNATIVE_THRESHOLD_KM, DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_MAX_PARALLEL_REQUESTS,
    DurationPolicy, OracleConfig,
};
pub use error::OracleError;

/// Outcome of a single-route lookup as stored in the cache.
#[derive(Debug, Clone)]
enum Lookup {
    Route(RoadRoute),
    Unreachable,
}

/// Road distance oracle with memoisation and geometric fallback.
///
/// # Examples
/// ```
/// use wayfarer_core::{LatLng, test_support::FailingRoutingProvider};
/// use wayfarer_routing::{DistanceOracle, OracleConfig};
///
/// let oracle = DistanceOracle::new(FailingRoutingProvider::offline(), OracleConfig::default());
/// let route = oracle.distance(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0))?;
/// assert!(route.is_fallback());
/// // The estimate is cached, so the provider is not consulted again.
/// oracle.distance(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0))?;
/// assert_eq!(oracle.external_calls(), 1);
/// # Ok::<(), wayfarer_routing::OracleError>(())
/// ```
#[derive(Debug)]
pub struct DistanceOracle<P> {
    provider: P,
    config: OracleConfig,
    routes: RouteCache<Lookup>,
    alternatives: RouteCache<Vec<RoadRoute>>,
    external_calls: AtomicUsize,
}

impl<P: RoutingProvider> DistanceOracle<P> {
    /// Wrap `provider` with an empty cache.
    #[must_use]
    pub fn new(provider: P, config: OracleConfig) -> Self {
        Self {
            provider,
            config,
            routes: RouteCache::new(),
            alternatives: RouteCache::new(),
            external_calls: AtomicUsize::new(0),
        }
    }

    /// The oracle's configuration.
    #[must_use]
    pub const fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// The wrapped provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Number of cached lookups of either kind.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.routes.len() + self.alternatives.len()
    }

    /// Number of requests sent to the provider so far.
    #[must_use]
    pub fn external_calls(&self) -> usize {
        self.external_calls.load(Ordering::SeqCst)
    }

    /// Road route from `from` to `to`.
    ///
    /// Cache hits return the stored route unchanged. Transient provider
    /// failures produce a cached great-circle estimate tagged as fallback.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::RouteImpossible`] when the provider reports that
    /// no road path exists and fallback for unreachable pairs is disabled.
    pub fn distance(&self, from: LatLng, to: LatLng) -> Result<RoadRoute, OracleError> {
        let lookup = self
            .routes
            .get_or_insert_with(RouteKey::new(from, to), || self.fetch_route(from, to));
        match lookup {
            Lookup::Route(route) => Ok(route),
            Lookup::Unreachable => Err(OracleError::RouteImpossible { from, to }),
        }
    }

    /// Up to `max_routes` routes from `from` to `to`, shortest first.
    ///
    /// The first request for a pair decides what is cached; later requests
    /// are truncated to their own `max_routes`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::RouteImpossible`] when no road path exists.
    pub fn alternatives(
        &self,
        from: LatLng,
        to: LatLng,
        max_routes: usize,
    ) -> Result<Vec<RoadRoute>, OracleError> {
        let mut routes = self.alternatives.get_or_insert_with(RouteKey::new(from, to), || {
            self.fetch_alternatives(from, to, max_routes.max(1))
        });
        if routes.is_empty() {
            return Err(OracleError::RouteImpossible { from, to });
        }
        routes.truncate(max_routes.max(1));
        Ok(routes)
    }

    /// Pairwise distance matrix for `waypoints`.
    ///
    /// Every ordered pair `(i, j)` with `i != j` is looked up through
    /// [`DistanceOracle::distance`] on a pool of
    /// [`OracleConfig::max_parallel_requests`] workers; the diagonal is zero.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::WaypointsNotConnected`] for the first pair, in
    /// row-major order, with no road path.
    pub fn matrix(&self, waypoints: &[Waypoint]) -> Result<DistanceMatrix, OracleError> {
        let n = waypoints.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();
        let lookup = |&(i, j): &(usize, usize)| {
            let from = waypoints.get(i).map(|w| w.location);
            let to = waypoints.get(j).map(|w| w.location);
            let outcome = match (from, to) {
                (Some(from), Some(to)) => self.distance(from, to).map(|route| route.distance_km),
                _ => Ok(0.0),
            };
            (i, j, outcome)
        };
        let results: Vec<(usize, usize, Result<f64, OracleError>)> =
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.max_parallel_requests.max(1))
                .build()
            {
                Ok(pool) => pool.install(|| pairs.par_iter().map(lookup).collect()),
                Err(err) => {
                    warn!("matrix worker pool unavailable, looking up sequentially: {err}");
                    pairs.iter().map(lookup).collect()
                }
            };

        let mut matrix = DistanceMatrix::zeros(n);
        for (i, j, outcome) in results {
            match outcome {
                Ok(km) => matrix.set(i, j, km),
                Err(_) => return Err(OracleError::WaypointsNotConnected { from: i, to: j }),
            }
        }
        debug!(
            "built {n}x{n} distance matrix ({} cached lookups, {} provider calls)",
            self.cache_len(),
            self.external_calls()
        );
        Ok(matrix)
    }

    fn fetch_route(&self, from: LatLng, to: LatLng) -> Lookup {
        self.external_calls.fetch_add(1, Ordering::SeqCst);
        match self
            .provider
            .route(from, to, RoutePreference::Recommended)
            .and_then(validate_route)
        {
            Ok(route) => Lookup::Route(self.apply_duration_policy(route)),
            Err(err) if err.is_unreachable() && !self.config.fallback_on_unreachable => {
                warn!("no road route from {from:?} to {to:?}");
                Lookup::Unreachable
            }
            Err(err) => {
                warn!("routing failed from {from:?} to {to:?}, using geometric estimate: {err}");
                Lookup::Route(fallback_route(from, to, self.config.average_speed_kmh))
            }
        }
    }

    fn fetch_alternatives(&self, from: LatLng, to: LatLng, max_routes: usize) -> Vec<RoadRoute> {
        self.external_calls.fetch_add(1, Ordering::SeqCst);
        let provided = self
            .provider
            .alternatives(from, to, max_routes)
            .and_then(|routes| {
                routes
                    .into_iter()
                    .map(validate_route)
                    .collect::<Result<Vec<_>, _>>()
            });
        let mut routes = match provided {
            Ok(routes) => routes,
            Err(ProviderError::RouteTooLong) => {
                debug!("alternatives from {from:?} to {to:?} too long, synthesising");
                self.synthesise_alternatives(from, to, max_routes)
            }
            Err(err) if err.is_unreachable() && !self.config.fallback_on_unreachable => {
                warn!("no road route from {from:?} to {to:?}");
                return Vec::new();
            }
            Err(err) => {
                warn!("alternative routing failed from {from:?} to {to:?}: {err}");
                Vec::new()
            }
        };
        if routes.is_empty() {
            return self.distance(from, to).map(|route| vec![route]).unwrap_or_default();
        }
        routes = routes
            .into_iter()
            .map(|route| self.apply_duration_policy(route))
            .collect();
        routes.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        routes.truncate(max_routes);
        routes
    }

    fn synthesise_alternatives(&self, from: LatLng, to: LatLng, max_routes: usize) -> Vec<RoadRoute> {
        let threshold = self.config.alternative_threshold_km;
        let mut collected: Vec<RoadRoute> = Vec::new();
        for preference in RoutePreference::SYNTHESIS_ORDER {
            if collected.len() >= max_routes {
                break;
            }
            self.external_calls.fetch_add(1, Ordering::SeqCst);
            match self
                .provider
                .route(from, to, preference)
                .and_then(validate_route)
            {
                Ok(route) => {
                    let distinct = collected
                        .iter()
                        .all(|kept| (kept.distance_km - route.distance_km).abs() > threshold);
                    if distinct {
                        collected.push(route);
                    } else {
                        debug!(
                            "discarding {preference:?} route of {:.1} km: within {threshold} km of a kept route",
                            route.distance_km
                        );
                    }
                }
                Err(err) => debug!("{preference:?} route unavailable: {err}"),
            }
        }
        collected
    }

    fn apply_duration_policy(&self, mut route: RoadRoute) -> RoadRoute {
        if self.config.duration_policy == DurationPolicy::AverageSpeed {
            route.detail.duration_minutes =
                minutes_at(route.distance_km, self.config.average_speed_kmh);
        }
        route
    }
}

/// Reject provider answers with unusable distances.
fn validate_route(route: RoadRoute) -> Result<RoadRoute, ProviderError> {
    if route.distance_km.is_finite() && route.distance_km >= 0.0 {
        Ok(route)
    } else {
        Err(ProviderError::ParseError {
            message: format!("invalid route distance {}", route.distance_km),
        })
    }
}
