//! Facade crate for the Wayfarer route optimizer.
//!
//! This crate re-exports the core domain types and exposes the routing
//! provider and the hybrid optimizer behind feature flags.

#![forbid(unsafe_code)]

pub use wayfarer_core::{
    AlternativeRoute, DistanceMatrix, LatLng, OptimizeError, OptimizeRequest, OptimizeResponse,
    PhaseDiagnostic, ProviderError, RoadRoute, RouteOptimizer, RoutingProvider, Segment, Tour,
    TourConstraints, Waypoint, WaypointInput,
};

#[cfg(feature = "routing-ors")]
pub use wayfarer_routing::{DistanceOracle, HttpRoutingProvider, OracleConfig, OracleError};

#[cfg(feature = "optimizer")]
pub use wayfarer_optimizer::{HybridOptimizer, OptimizerConfig};
