use thiserror::Error;
use wayfarer_core::LatLng;

/// Errors surfaced by [`crate::DistanceOracle`].
///
/// Transient provider failures never appear here: the oracle recovers from
/// them with a geometric estimate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    /// No road path connects the two points.
    #[error("locations not connected: no road route from {from:?} to {to:?}")]
    RouteImpossible {
        /// Departure point.
        from: LatLng,
        /// Arrival point.
        to: LatLng,
    },
    /// No road path connects two waypoints of a matrix request.
    #[error("locations not connected: no road route from waypoint {from} to waypoint {to}")]
    WaypointsNotConnected {
        /// Departure waypoint index.
        from: usize,
        /// Arrival waypoint index.
        to: usize,
    },
}
