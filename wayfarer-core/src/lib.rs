//! Core domain types for the Wayfarer route optimizer.
//!
//! The crate defines waypoints, distance matrices, tours and their
//! constraints, the road-route records a routing provider returns, and the
//! request/response contract of a [`RouteOptimizer`]. Validating constructors
//! return `Result` so malformed input is rejected before any search starts.

mod matrix;
mod optimizer;
mod route;
pub mod routing;
mod tour;
mod waypoint;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use matrix::{DistanceMatrix, MatrixError};
pub use optimizer::{
    DEFAULT_SEED, OptimizationStats, OptimizeError, OptimizeRequest, OptimizeResponse, Phase,
    PhaseDiagnostic, PhaseResult, RouteOptimizer,
};
pub use route::{AlternativeRoute, ProviderTag, RoadRoute, RouteDetail, Segment, SegmentEndpoint};
pub use routing::{ProviderError, RoutePreference, RoutingProvider};
pub use tour::{Tour, TourConstraints, TourError};
pub use waypoint::{LatLng, Waypoint, WaypointError, WaypointInput, validate_waypoints};
