//! Hybrid route optimizer for Wayfarer.
//!
//! This crate provides [`HybridOptimizer`], the default implementation of the
//! [`RouteOptimizer`](wayfarer_core::RouteOptimizer) trait. A request runs
//! through a fixed pipeline over a road distance matrix built by a
//! [`DistanceOracle`](wayfarer_routing::DistanceOracle):
//!
//! 1. **Explore**: an annealed sampler draws whole tours from a bias
//!    distribution that rotates with each round.
//! 2. **Exploit**: a whale-optimization population search seeded with the
//!    explored tour.
//! 3. **Refine**: first-improvement 2-opt.
//! 4. **Select**: the cheapest of the three phase tours.
//! 5. **Alternatives**: a ranked list of candidate routes, exhaustive for
//!    small requests and a heuristic portfolio for larger ones.
//!
//! Every randomized step draws from a `ChaCha8Rng` seeded by the request, so
//! identical requests produce identical responses.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod alternatives;
mod assemble;
mod config;
mod construct;
mod phases;
mod pipeline;
mod problem;

pub use alternatives::{
    FASTEST_ROUTE, OPTIMAL_ROUTE, PALETTE, generate_alternatives, option_name,
};
pub use assemble::{AssembledRoute, RouteAssembler, join_geometry};
pub use config::OptimizerConfig;
pub use construct::{farthest_insertion, nearest_neighbour, random_tour};
pub use phases::{PhaseError, exploit, explore, refine};
pub use pipeline::{HybridOptimizer, OPTIMIZATION_METHOD};
pub use problem::Problem;
