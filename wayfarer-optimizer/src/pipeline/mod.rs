//! `HybridOptimizer`: the explore, exploit, refine, select pipeline.
//!
//! Phase failures never abort a request. A failing phase is logged and
//! replaced by a nearest-neighbour tour flagged as a fallback, and the next
//! phase starts from it.

use std::collections::HashSet;
use std::time::Instant;

use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wayfarer_core::{
    LatLng, OptimizationStats, OptimizeError, OptimizeRequest, OptimizeResponse, Phase,
    PhaseDiagnostic, PhaseResult, RouteOptimizer, RoutingProvider, Waypoint, validate_waypoints,
};
use wayfarer_routing::{DistanceOracle, OracleError};

use crate::phases::PhaseError;
use crate::{
    AssembledRoute, OptimizerConfig, Problem, RouteAssembler, exploit, explore,
    generate_alternatives, nearest_neighbour, refine,
};

/// Label reported in [`OptimizeResponse::optimization_method`].
pub const OPTIMIZATION_METHOD: &str = "hybrid";

const FALLBACK_ALGORITHM: &str = "nearest_neighbour";

/// Route optimizer running annealed sampling, whale optimization and 2-opt
/// over road distances from a [`DistanceOracle`].
///
/// The oracle's cache lives as long as the optimizer, so repeated requests
/// over the same places reuse earlier lookups.
///
/// # Examples
/// ```
/// use wayfarer_core::test_support::StubRoutingProvider;
/// use wayfarer_core::{OptimizeRequest, RouteOptimizer, WaypointInput};
/// use wayfarer_optimizer::HybridOptimizer;
/// use wayfarer_routing::{DistanceOracle, OracleConfig};
///
/// let oracle = DistanceOracle::new(StubRoutingProvider::straight_line(), OracleConfig::default());
/// let optimizer = HybridOptimizer::new(oracle);
/// let response = optimizer.optimize(&OptimizeRequest::new(vec![
///     WaypointInput::new(0.0, 0.0, Some("Depot")),
///     WaypointInput::new(0.0, 3.0, None),
///     WaypointInput::new(0.0, 1.0, None),
///     WaypointInput::new(0.0, 4.0, Some("Hotel")),
/// ]))?;
/// assert_eq!(response.optimized_order, vec![0, 2, 1, 3]);
/// # Ok::<(), wayfarer_core::OptimizeError>(())
/// ```
#[derive(Debug)]
pub struct HybridOptimizer<P> {
    oracle: DistanceOracle<P>,
    config: OptimizerConfig,
}

impl<P: RoutingProvider> HybridOptimizer<P> {
    /// Construct an optimizer using default configuration.
    #[must_use]
    pub fn new(oracle: DistanceOracle<P>) -> Self {
        Self::with_config(oracle, OptimizerConfig::default())
    }

    /// Construct an optimizer with explicit configuration.
    ///
    /// The constraints and seed in `config` are replaced per request by the
    /// values the request carries.
    #[must_use]
    pub const fn with_config(oracle: DistanceOracle<P>, config: OptimizerConfig) -> Self {
        Self { oracle, config }
    }

    /// The oracle supplying road distances.
    #[must_use]
    pub const fn oracle(&self) -> &DistanceOracle<P> {
        &self.oracle
    }

    /// Base configuration.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Run the pipeline over validated `waypoints`.
    fn run(
        &self,
        waypoints: &[Waypoint],
        config: &OptimizerConfig,
    ) -> Result<OptimizeResponse, OptimizeError> {
        let started_at = Instant::now();
        info!(
            "optimizing {} waypoints (fixed start: {}, fixed end: {})",
            waypoints.len(),
            config.constraints.fixed_start,
            config.constraints.fixed_end
        );
        let matrix = self
            .oracle
            .matrix(waypoints)
            .map_err(|err| not_connected(err, waypoints))?;
        let problem = Problem::new(&matrix, config.constraints);

        let explored = guarded(
            &problem,
            Phase::Explore,
            explore(
                &problem,
                config.explore_rounds,
                &mut phase_rng(config.seed, Phase::Explore),
            ),
        )?;
        let exploited = guarded(
            &problem,
            Phase::Exploit,
            exploit(
                &problem,
                &explored.tour,
                config.exploit_rounds,
                &mut phase_rng(config.seed, Phase::Exploit),
            ),
        )?;
        let refined = guarded(
            &problem,
            Phase::Refine,
            refine(&problem, &exploited.tour, config.refine_passes),
        )?;
        let phases = [explored, exploited, refined];
        let selected = phases
            .iter()
            .min_by(|a, b| a.cost.total_cmp(&b.cost))
            .ok_or(OptimizeError::NoValidTour)?;
        info!(
            "selected {} tour at {:.3} km",
            selected.phase, selected.cost
        );

        let assembler = RouteAssembler::new(&self.oracle, waypoints);
        let alternatives =
            match generate_alternatives(&assembler, &problem, &phases, &selected.tour, config) {
                Ok(routes) => routes,
                Err(err) => {
                    warn!("alternative routes unavailable: {err}");
                    Vec::new()
                }
            };
        let primary = match alternatives.first() {
            Some(best) => AssembledRoute::from(best.clone()),
            None => assembler.assemble(&selected.tour)?,
        };

        let [explore_run, exploit_run, _] = &phases;
        let stats = OptimizationStats {
            optimization_time_secs: started_at.elapsed().as_secs_f64(),
            explore_rounds: explore_run.rounds,
            exploit_rounds: exploit_run.rounds,
            distinct_waypoints: distinct_positions(waypoints),
        };
        info!(
            "optimized route: {:.3} km, {:.1} min, {} alternatives in {:.3}s",
            primary.distance_km,
            primary.duration_minutes,
            alternatives.len(),
            stats.optimization_time_secs
        );
        Ok(OptimizeResponse {
            optimized_order: primary.order,
            total_distance_km: primary.distance_km,
            total_duration_minutes: primary.duration_minutes,
            route_geometry: primary.geometry,
            segments: primary.segments,
            optimization_method: OPTIMIZATION_METHOD.to_owned(),
            phases: phases.iter().map(PhaseDiagnostic::from).collect(),
            alternative_routes: alternatives,
            stats,
        })
    }
}

impl<P: RoutingProvider> RouteOptimizer for HybridOptimizer<P> {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeResponse, OptimizeError> {
        let waypoints = validate_waypoints(&request.waypoints)?;
        let config = self
            .config
            .with_constraints(request.constraints())
            .with_seed(request.seed);
        self.run(&waypoints, &config)
    }
}

/// Independent generator for `phase`, derived from the request seed.
fn phase_rng(seed: u64, phase: Phase) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(match phase {
        Phase::Explore => 0,
        Phase::Exploit => 1,
        Phase::Refine => 2,
    });
    rng
}

fn guarded(
    problem: &Problem<'_>,
    phase: Phase,
    outcome: Result<PhaseResult, PhaseError>,
) -> Result<PhaseResult, OptimizeError> {
    match outcome {
        Ok(result) => {
            info!(
                "{phase} finished: {} at {:.3} km after {} rounds",
                result.algorithm, result.cost, result.rounds
            );
            Ok(result)
        }
        Err(err) => {
            warn!("{phase} failed, falling back to nearest neighbour: {err}");
            let tour = nearest_neighbour(problem);
            problem
                .validate(&tour)
                .map_err(|_| OptimizeError::NoValidTour)?;
            Ok(PhaseResult {
                phase,
                algorithm: FALLBACK_ALGORITHM,
                cost: problem.cost(&tour),
                tour,
                rounds: 0,
                fallback: true,
            })
        }
    }
}

fn not_connected(err: OracleError, waypoints: &[Waypoint]) -> OptimizeError {
    match err {
        OracleError::WaypointsNotConnected { from, to } => {
            OptimizeError::RouteImpossible { from, to }
        }
        OracleError::RouteImpossible { from, to } => {
            let index_of = |point: LatLng| {
                waypoints
                    .iter()
                    .position(|w| w.location == point)
                    .unwrap_or_default()
            };
            OptimizeError::RouteImpossible {
                from: index_of(from),
                to: index_of(to),
            }
        }
    }
}

fn distinct_positions(waypoints: &[Waypoint]) -> usize {
    waypoints
        .iter()
        .map(|w| (w.location.lat.to_bits(), w.location.lng.to_bits()))
        .collect::<HashSet<_>>()
        .len()
}
