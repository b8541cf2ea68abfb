//! Ranked alternative routes offered alongside the selected tour.
//!
//! The strategy depends on the number of waypoints:
//!
//! - two waypoints: distinct road routes between them from the oracle;
//! - up to [`OptimizerConfig::exhaustive_limit`]: every arrangement of the
//!   free positions, cheapest first;
//! - more: a portfolio of construction heuristics, refined random restarts
//!   and the phase tours.
//!
//! The returned list is strictly ascending by distance and coloured by rank:
//! a route no longer than the one ranked before it is dropped, which also
//! removes the mirror image of a tour when distances are symmetric.

use std::collections::HashSet;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wayfarer_core::{AlternativeRoute, OptimizeError, Phase, PhaseResult, RoutingProvider, Tour};

use crate::{
    AssembledRoute, OptimizerConfig, Problem, RouteAssembler, farthest_insertion,
    nearest_neighbour, random_tour, refine,
};

/// Route colours assigned by rank.
pub const PALETTE: [&str; 7] = [
    "#3b82f6", "#ef4444", "#f97316", "#14b8a6", "#a855f7", "#ec4899", "#f59e0b",
];

/// Label of the best route between two waypoints.
pub const FASTEST_ROUTE: &str = "Fastest Route";

/// Label of the best enumerated tour.
pub const OPTIMAL_ROUTE: &str = "Optimal Route";

/// Routes whose lengths differ by no more than this many kilometres tie.
const DISTANCE_TIE_KM: f64 = 1e-9;

/// Label for the route at zero-based `rank`; the first takes `first`.
///
/// # Examples
/// ```
/// use wayfarer_optimizer::{OPTIMAL_ROUTE, option_name};
///
/// assert_eq!(option_name(0, OPTIMAL_ROUTE), "Optimal Route");
/// assert_eq!(option_name(2, OPTIMAL_ROUTE), "Route Option 3");
/// ```
#[must_use]
pub fn option_name(rank: usize, first: &str) -> String {
    if rank == 0 {
        first.to_owned()
    } else {
        format!("Route Option {}", rank + 1)
    }
}

/// Build the ranked alternatives for a request.
///
/// `selected` fixes the travel direction of a two-waypoint trip; `phases`
/// joins the heuristic portfolio for larger requests.
///
/// # Errors
///
/// Returns [`OptimizeError::RouteImpossible`] when the oracle finds no road
/// between the two waypoints of a pair request.
pub fn generate_alternatives<P: RoutingProvider>(
    assembler: &RouteAssembler<'_, P>,
    problem: &Problem<'_>,
    phases: &[PhaseResult],
    selected: &Tour,
    config: &OptimizerConfig,
) -> Result<Vec<AlternativeRoute>, OptimizeError> {
    let n = problem.len();
    let routes = if n < 2 {
        Vec::new()
    } else if n == 2 {
        pair_routes(assembler, selected, config)?
    } else if n <= config.exhaustive_limit {
        exhaustive_routes(assembler, problem, config)
    } else {
        portfolio_routes(assembler, problem, phases, config)
    };
    info!("generated {} alternative routes", routes.len());
    Ok(routes)
}

fn pair_routes<P: RoutingProvider>(
    assembler: &RouteAssembler<'_, P>,
    selected: &Tour,
    config: &OptimizerConfig,
) -> Result<Vec<AlternativeRoute>, OptimizeError> {
    let (from, to) = match *selected.as_slice() {
        [from, to] => (from, to),
        _ => (0, 1),
    };
    let mut routes = assembler.alternatives(from, to, config.pair_alternatives)?;
    sort_by_distance(&mut routes);
    let mut seen = HashSet::new();
    routes.retain(|route| seen.insert(decimetres(route.distance_km)));
    Ok(label(routes, |rank| option_name(rank, FASTEST_ROUTE)))
}

fn exhaustive_routes<P: RoutingProvider>(
    assembler: &RouteAssembler<'_, P>,
    problem: &Problem<'_>,
    config: &OptimizerConfig,
) -> Vec<AlternativeRoute> {
    let free = problem.free_positions();
    let mut order = Tour::identity(problem.len()).into_inner();
    let mut routes = Vec::new();
    loop {
        match assembler.assemble(&Tour::new(order.clone())) {
            Ok(route) => routes.push(route),
            Err(err) => warn!("skipping arrangement {order:?}: {err}"),
        }
        let advanced = order
            .get_mut(free.clone())
            .is_some_and(next_permutation);
        if !advanced {
            break;
        }
    }
    debug!("enumerated {} arrangements", routes.len());
    sort_by_distance(&mut routes);
    routes.dedup_by(|later, kept| same_length(later.distance_km, kept.distance_km));
    routes.truncate(config.exhaustive_keep);
    label(routes, |rank| option_name(rank, OPTIMAL_ROUTE))
}

fn portfolio_routes<P: RoutingProvider>(
    assembler: &RouteAssembler<'_, P>,
    problem: &Problem<'_>,
    phases: &[PhaseResult],
    config: &OptimizerConfig,
) -> Vec<AlternativeRoute> {
    let mut candidates: Vec<(String, Tour)> = phases
        .iter()
        .map(|result| (phase_route_name(result.phase).to_owned(), result.tour.clone()))
        .collect();
    candidates.push(("Nearest Neighbor Route".to_owned(), nearest_neighbour(problem)));
    candidates.push((
        "Farthest Insertion Route".to_owned(),
        farthest_insertion(problem),
    ));
    for (k, &seed) in config.restart_seeds.iter().enumerate() {
        let start = random_tour(problem, &mut ChaCha8Rng::seed_from_u64(seed));
        match refine(problem, &start, config.refine_passes) {
            Ok(result) => candidates.push((format!("Random Restart Route {}", k + 1), result.tour)),
            Err(err) => warn!("random restart {seed} failed: {err}"),
        }
    }

    let mut seen = HashSet::new();
    let mut named: Vec<(String, AssembledRoute)> = Vec::new();
    for (name, tour) in candidates {
        if !seen.insert(tour.clone()) {
            continue;
        }
        match assembler.assemble(&tour) {
            Ok(route) => named.push((name, route)),
            Err(err) => warn!("skipping {name}: {err}"),
        }
    }
    named.sort_by(|(_, a), (_, b)| a.distance_km.total_cmp(&b.distance_km));
    named.dedup_by(|(_, later), (_, kept)| same_length(later.distance_km, kept.distance_km));
    named.truncate(config.portfolio_cap);
    named
        .into_iter()
        .enumerate()
        .map(|(rank, (name, route))| route.into_alternative(name, colour(rank)))
        .collect()
}

const fn phase_route_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Explore => "Annealed Sampling Route",
        Phase::Exploit => "Whale Optimization Route",
        Phase::Refine => "Final Optimized Route",
    }
}

fn sort_by_distance(routes: &mut [AssembledRoute]) {
    routes.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
}

#[expect(clippy::float_arithmetic, reason = "distance tolerance")]
fn same_length(a: f64, b: f64) -> bool {
    (a - b).abs() <= DISTANCE_TIE_KM
}

fn label(routes: Vec<AssembledRoute>, name: impl Fn(usize) -> String) -> Vec<AlternativeRoute> {
    routes
        .into_iter()
        .enumerate()
        .map(|(rank, route)| route.into_alternative(name(rank), colour(rank)))
        .collect()
}

fn colour(rank: usize) -> &'static str {
    PALETTE
        .get(rank % PALETTE.len())
        .copied()
        .unwrap_or(PALETTE[0])
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "distances are bucketed to 0.1 km"
)]
fn decimetres(km: f64) -> i64 {
    (km * 10.0).round() as i64
}

/// Advance `items` to the next lexicographic permutation.
///
/// Returns `false`, leaving `items` untouched, when it is already the last.
fn next_permutation(items: &mut [usize]) -> bool {
    let Some(pivot) = items
        .windows(2)
        .rposition(|pair| matches!(pair, [a, b] if a < b))
    else {
        return false;
    };
    let Some(&value) = items.get(pivot) else {
        return false;
    };
    let Some(successor) = items.iter().rposition(|&item| item > value) else {
        return false;
    };
    items.swap(pivot, successor);
    if let Some(tail) = items.get_mut(pivot + 1..) {
        tail.reverse();
    }
    true
}
