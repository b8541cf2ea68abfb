use std::fmt;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{AlternativeRoute, LatLng, Segment, Tour, TourConstraints, WaypointError, WaypointInput};

/// Parameters for an optimization request.
///
/// Both endpoints are pinned by default and the seed defaults to `42`, so two
/// identical requests produce identical responses.
///
/// # Examples
/// ```rust
/// use wayfarer_core::{OptimizeRequest, WaypointInput};
///
/// let request = OptimizeRequest::new(vec![
///     WaypointInput::new(0.0, 0.0, Some("Depot")),
///     WaypointInput::new(0.0, 1.0, None),
/// ]);
/// assert!(request.fixed_start && request.fixed_end);
/// assert_eq!(request.seed, 42);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizeRequest {
    /// Stops to visit, in input order.
    pub waypoints: Vec<WaypointInput>,
    /// Pin the first waypoint to the start of every tour.
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub fixed_start: bool,
    /// Pin the last waypoint to the end of every tour.
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub fixed_end: bool,
    /// Seed for the randomized phases.
    #[cfg_attr(feature = "serde", serde(default = "default_seed"))]
    pub seed: u64,
}

/// Seed used when a request does not supply one.
pub const DEFAULT_SEED: u64 = 42;

#[cfg(feature = "serde")]
const fn default_true() -> bool {
    true
}

#[cfg(feature = "serde")]
const fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl OptimizeRequest {
    /// Build a request with both endpoints pinned and the default seed.
    #[must_use]
    pub const fn new(waypoints: Vec<WaypointInput>) -> Self {
        Self {
            waypoints,
            fixed_start: true,
            fixed_end: true,
            seed: DEFAULT_SEED,
        }
    }

    /// Endpoint constraints carried by the request.
    #[must_use]
    pub const fn constraints(&self) -> TourConstraints {
        TourConstraints {
            fixed_start: self.fixed_start,
            fixed_end: self.fixed_end,
        }
    }
}

/// The search stage that produced a [`PhaseResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    /// Annealed stochastic sampling.
    Explore,
    /// Whale-optimization population search.
    Exploit,
    /// 2-opt local search.
    Refine,
}

impl Phase {
    /// Stable lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explore => "explore",
            Self::Exploit => "exploit",
            Self::Refine => "refine",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one pipeline phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseResult {
    /// Which phase ran.
    pub phase: Phase,
    /// Algorithm that produced the tour, e.g. `"two_opt"`.
    pub algorithm: &'static str,
    /// Best tour found.
    pub tour: Tour,
    /// Matrix cost of `tour` in kilometres.
    pub cost: f64,
    /// Rounds or passes the phase completed.
    pub rounds: usize,
    /// `true` when the phase failed and a deterministic construction stood in.
    pub fallback: bool,
}

/// Per-phase summary included in responses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseDiagnostic {
    /// Which phase ran.
    pub phase: Phase,
    /// Algorithm tag.
    pub algorithm: String,
    /// Matrix cost of the phase's tour in kilometres.
    pub cost: f64,
    /// Rounds or passes completed.
    pub rounds: usize,
    /// Whether the phase fell back to a deterministic construction.
    pub fallback: bool,
}

impl From<&PhaseResult> for PhaseDiagnostic {
    fn from(result: &PhaseResult) -> Self {
        Self {
            phase: result.phase,
            algorithm: result.algorithm.to_owned(),
            cost: result.cost,
            rounds: result.rounds,
            fallback: result.fallback,
        }
    }
}

/// Run statistics attached to a response.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizationStats {
    /// Wall-clock time spent optimizing, in seconds.
    pub optimization_time_secs: f64,
    /// Rounds run by the exploration phase.
    pub explore_rounds: usize,
    /// Rounds run by the exploitation phase.
    pub exploit_rounds: usize,
    /// Number of distinct waypoint positions in the request.
    pub distinct_waypoints: usize,
}

/// Response from a successful optimization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimizeResponse {
    /// Best visiting order over input indices.
    pub optimized_order: Vec<usize>,
    /// Total road distance of the best order.
    pub total_distance_km: f64,
    /// Total travel time of the best order.
    pub total_duration_minutes: f64,
    /// Path vertices of the best order.
    pub route_geometry: Vec<LatLng>,
    /// Per-leg breakdown of the best order.
    pub segments: Vec<Segment>,
    /// Label for the optimization strategy.
    pub optimization_method: String,
    /// One entry per search phase.
    pub phases: Vec<PhaseDiagnostic>,
    /// Ranked candidate routes, cheapest first.
    pub alternative_routes: Vec<AlternativeRoute>,
    /// Run statistics.
    pub stats: OptimizationStats,
}

/// Errors returned by [`RouteOptimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// The request was malformed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] WaypointError),
    /// Two waypoints are not connected by road.
    #[error("locations not connected: no road route from waypoint {from} to waypoint {to}")]
    RouteImpossible {
        /// Departure waypoint index.
        from: usize,
        /// Arrival waypoint index.
        to: usize,
    },
    /// No phase produced a tour satisfying the constraints.
    #[error("no valid tour could be constructed")]
    NoValidTour,
}

impl OptimizeError {
    /// Stable machine-readable tag for the error.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::OptimizeError;
    ///
    /// assert_eq!(OptimizeError::NoValidTour.kind(), "no_valid_tour");
    /// ```
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::RouteImpossible { .. } => "route_impossible",
            Self::NoValidTour => "no_valid_tour",
        }
    }
}

/// Find a good visiting order for a request's waypoints.
///
/// Implementations should return [`OptimizeError::InvalidInput`] for
/// malformed requests rather than panicking. Optimizers must be `Send + Sync`
/// so a single instance can serve concurrent requests.
pub trait RouteOptimizer: Send + Sync {
    /// Optimize a request, producing a response or an error.
    ///
    /// # Errors
    ///
    /// See [`OptimizeError`].
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizeError>;
}
