//! Tuning knobs for [`crate::HybridOptimizer`].

use wayfarer_core::{DEFAULT_SEED, TourConstraints};

/// Configuration for one pipeline run.
///
/// The defaults reproduce the reference behaviour: 20 exploration rounds,
/// 30 exploitation rounds, at most 50 improving 2-opt passes, exhaustive
/// enumeration up to five waypoints, and random restarts seeded with 42 and
/// 43.
///
/// # Examples
/// ```
/// use wayfarer_core::TourConstraints;
/// use wayfarer_optimizer::OptimizerConfig;
///
/// let config = OptimizerConfig::default()
///     .with_constraints(TourConstraints::free())
///     .with_seed(7);
/// assert_eq!(config.explore_rounds, 20);
/// assert_eq!(config.seed, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizerConfig {
    /// Endpoints every tour must respect.
    pub constraints: TourConstraints,
    /// Seed for the exploration and exploitation generators.
    pub seed: u64,
    /// Rounds of the annealed sampler.
    pub explore_rounds: usize,
    /// Rounds of the whale-optimization search.
    pub exploit_rounds: usize,
    /// Maximum improving passes of 2-opt.
    pub refine_passes: usize,
    /// Largest waypoint count whose tours are enumerated exhaustively.
    pub exhaustive_limit: usize,
    /// Routes kept from an exhaustive enumeration.
    pub exhaustive_keep: usize,
    /// Routes kept from the heuristic portfolio.
    pub portfolio_cap: usize,
    /// Road alternatives requested for a two-waypoint trip.
    pub pair_alternatives: usize,
    /// Seeds of the refined random-restart tours in the portfolio.
    pub restart_seeds: [u64; 2],
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            constraints: TourConstraints::both_fixed(),
            seed: DEFAULT_SEED,
            explore_rounds: 20,
            exploit_rounds: 30,
            refine_passes: 50,
            exhaustive_limit: 5,
            exhaustive_keep: 5,
            portfolio_cap: 7,
            pair_alternatives: 3,
            restart_seeds: [42, 43],
        }
    }
}

impl OptimizerConfig {
    /// Replace the endpoint constraints.
    #[must_use]
    pub const fn with_constraints(mut self, constraints: TourConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Replace the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the exploration round count.
    #[must_use]
    pub const fn with_explore_rounds(mut self, rounds: usize) -> Self {
        self.explore_rounds = rounds;
        self
    }

    /// Replace the exploitation round count.
    #[must_use]
    pub const fn with_exploit_rounds(mut self, rounds: usize) -> Self {
        self.exploit_rounds = rounds;
        self
    }

    /// Replace the 2-opt pass limit.
    #[must_use]
    pub const fn with_refine_passes(mut self, passes: usize) -> Self {
        self.refine_passes = passes;
        self
    }
}
