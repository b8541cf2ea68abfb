//! Property-based tests for the hybrid optimizer.
//!
//! # Invariants tested
//!
//! - **Permutation:** every phase and the final order visit each waypoint once.
//! - **Fixed endpoints:** pinned waypoints stay in their slots.
//! - **Refinement:** 2-opt never returns a more expensive tour.
//! - **Ranking:** alternatives are strictly ascending by distance with no
//!   repeated tour.
//! - **Optimality:** for up to five waypoints the first alternative is the
//!   constrained optimum.


use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wayfarer_core::test_support::StubRoutingProvider;
use wayfarer_core::{OptimizeRequest, RouteOptimizer, Tour, WaypointInput, validate_waypoints};
use wayfarer_optimizer::{HybridOptimizer, Problem, exploit, explore, random_tour, refine};
use wayfarer_routing::{DistanceOracle, OracleConfig};

use proptest_support::{
    assert_permutation, brute_force_optimum, constraints_strategy, matrix_strategy,
    waypoints_strategy,
};

fn optimizer() -> HybridOptimizer<StubRoutingProvider> {
    HybridOptimizer::new(DistanceOracle::new(
        StubRoutingProvider::straight_line(),
        OracleConfig::default(),
    ))
}

fn request(waypoints: Vec<WaypointInput>, fixed_start: bool, fixed_end: bool, seed: u64) -> OptimizeRequest {
    let mut request = OptimizeRequest::new(waypoints);
    request.fixed_start = fixed_start;
    request.fixed_end = fixed_end;
    request.seed = seed;
    request
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: 2-opt output never costs more than its input.
    #[test]
    fn refine_never_increases_cost(
        matrix in matrix_strategy(2, 9),
        constraints in constraints_strategy(),
        seed in any::<u64>(),
    ) {
        let problem = Problem::new(&matrix, constraints);
        let start = random_tour(&problem, &mut ChaCha8Rng::seed_from_u64(seed));
        let result = refine(&problem, &start, 50).expect("refine accepts a valid tour");
        prop_assert!(result.cost <= problem.cost(&start) + 1e-9);
    }

    /// Property: every phase yields a tour honouring the constraints.
    #[test]
    fn phases_yield_valid_tours(
        matrix in matrix_strategy(1, 9),
        constraints in constraints_strategy(),
        seed in any::<u64>(),
    ) {
        let problem = Problem::new(&matrix, constraints);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let explored = explore(&problem, 20, &mut rng).expect("explore");
        let exploited = exploit(&problem, &explored.tour, 30, &mut rng).expect("exploit");
        let refined = refine(&problem, &exploited.tour, 50).expect("refine");
        for result in [&explored, &exploited, &refined] {
            prop_assert!(problem.validate(&result.tour).is_ok(), "{:?}", result.tour);
        }
        prop_assert!(exploited.cost <= explored.cost + 1e-9);
        prop_assert!(refined.cost <= exploited.cost + 1e-9);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: the optimized order is a permutation honouring the flags,
    /// and alternatives are ranked and distinct.
    #[test]
    fn optimized_order_is_valid(
        waypoints in waypoints_strategy(3, 9),
        fixed_start in any::<bool>(),
        fixed_end in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let n = waypoints.len();
        let response = optimizer()
            .optimize(&request(waypoints, fixed_start, fixed_end, seed))
            .expect("connected waypoints");

        assert_permutation(&response.optimized_order, n);
        if fixed_start {
            prop_assert_eq!(response.optimized_order.first(), Some(&0));
        }
        if fixed_end {
            prop_assert_eq!(response.optimized_order.last(), Some(&(n - 1)));
        }
        for pair in response.alternative_routes.windows(2) {
            if let [a, b] = pair {
                prop_assert!(a.distance_km < b.distance_km);
            }
        }
        let orders: HashSet<&Vec<usize>> =
            response.alternative_routes.iter().map(|r| &r.order).collect();
        prop_assert_eq!(orders.len(), response.alternative_routes.len());
    }

    /// Property: up to five waypoints, the first alternative is optimal.
    #[test]
    fn small_requests_are_optimal(
        waypoints in waypoints_strategy(3, 5),
        fixed_start in any::<bool>(),
        fixed_end in any::<bool>(),
    ) {
        let optimizer = optimizer();
        let request = request(waypoints, fixed_start, fixed_end, 42);
        let response = optimizer.optimize(&request).expect("connected waypoints");

        let validated = validate_waypoints(&request.waypoints).expect("valid waypoints");
        let matrix = optimizer.oracle().matrix(&validated).expect("cached matrix");
        let optimum = brute_force_optimum(&matrix, request.constraints());
        let best = response.alternative_routes.first().expect("alternatives");
        prop_assert!((best.distance_km - optimum).abs() < 1e-6);
        prop_assert!((response.total_distance_km - optimum).abs() < 1e-6);
        prop_assert_eq!(&best.order, &response.optimized_order);
        let cost = Tour::new(response.optimized_order.clone()).cost(&matrix);
        prop_assert!((cost - optimum).abs() < 1e-6);
    }

    /// Property: two-waypoint alternatives never repeat a 0.1 km distance.
    #[test]
    fn pair_alternatives_have_distinct_distances(
        waypoints in waypoints_strategy(2, 2),
        factors in proptest::collection::vec(1.0_f64..1.01, 1..4),
    ) {
        let provider = StubRoutingProvider::straight_line().with_alternative_factors(factors);
        let optimizer =
            HybridOptimizer::new(DistanceOracle::new(provider, OracleConfig::default()));
        let response = optimizer
            .optimize(&OptimizeRequest::new(waypoints))
            .expect("connected waypoints");

        prop_assert!(!response.alternative_routes.is_empty());
        let buckets: HashSet<i64> = response
            .alternative_routes
            .iter()
            .map(|r| (r.distance_km * 10.0).round() as i64)
            .collect();
        prop_assert_eq!(buckets.len(), response.alternative_routes.len());
        prop_assert_eq!(&response.optimized_order, &vec![0, 1]);
    }
}
