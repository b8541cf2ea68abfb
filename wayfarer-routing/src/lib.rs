//! Road distances for the Wayfarer route optimizer.
//!
//! The crate provides the [`DistanceOracle`], which memoises lookups in a
//! [`RouteCache`], recovers from provider outages with a great-circle
//! estimate, and builds distance matrices in parallel. The
//! [`HttpRoutingProvider`] talks to OpenRouteService.

mod cache;
mod fallback;
mod oracle;
pub mod ors;

pub use cache::{KEY_PRECISION, RouteKey, RouteCache};
pub use fallback::{GreatCircleProvider, ROAD_FACTOR, fallback_route, haversine_km, minutes_at};
pub use oracle::{
    DEFAULT_ALTERNATIVE_THRESHOLD_KM, DEFAULT_AVERAGE_SPEED_KMH, DEFAULT_MAX_PARALLEL_REQUESTS,
    DistanceOracle, DurationPolicy, OracleConfig, OracleError,
};
pub use ors::{HttpRoutingProvider, HttpRoutingProviderConfig, ProviderBuildError};
